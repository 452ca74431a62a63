//! End-to-end loader integration tests
//!
//! Tests model file loading → diagram metrics → Markov evaluation

use dependability_core::*;
use std::io::Write;

/// Helper to load a model from fixtures
fn load_fixture(name: &str) -> Model {
    let path = format!("tests/fixtures/models/{}.json", name);
    load_model(&path).expect("Failed to load model")
}

#[test]
fn test_pump_station() {
    let model = load_fixture("pump_station");

    assert_eq!(model.name, "pump station");
    assert_eq!(model.config.graph.max_paths, 8);
    assert_eq!(model.config.markov.max_components, 10);
    assert_eq!(model.components.len(), 4);
    assert_eq!(model.graph.success_paths().len(), 4);
    assert_eq!(model.graph.minimal_cuts(2).len(), 2);

    let markov = model.markov.as_ref().expect("markov block");
    let works =
        StatePredicate::from_success_paths(&model.graph.success_paths(), markov.components())
            .unwrap();
    let availability = model.graph.availability().unwrap();
    for t in [0.0, 1500.0, 40000.0, 750000.0] {
        let p = markov.value(t, &works).unwrap();
        assert!((p - availability.eval(t)).abs() < 1e-6);
    }
}

#[test]
fn test_voted_motors() {
    let model = load_fixture("voted_motors");

    assert_eq!(model.voters.len(), 1);
    assert!(model.markov.is_none());

    let found = model.graph.minimal_cuts(2);
    let names: Vec<Vec<&str>> = found.iter().map(MinimalCut::names).collect();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], vec!["alim voter"]);
    assert_eq!(names[1], vec!["Motor_A", "Motor_B"]);

    let mttf = model.graph.mttf().unwrap();
    assert!((mttf - 3785.714285714286).abs() < 1e-6);
}

#[test]
fn test_initially_unavailable_spare() {
    let model = load_fixture("spare_unit");
    let spare = model.component("Spare").unwrap();
    assert!(!spare.initially_available());
    assert_eq!(spare.availability().eval(0.0), 0.0);

    let markov = model.markov.as_ref().unwrap();
    assert_eq!(markov.initial(), &[0.0, 1.0, 0.0, 0.0]);

    let works =
        StatePredicate::from_success_paths(&model.graph.success_paths(), markov.components())
            .unwrap();
    let availability = model.graph.availability().unwrap();
    for t in [0.0, 10.0, 300.0, 9000.0] {
        let p = markov.value(t, &works).unwrap();
        assert!((p - availability.eval(t)).abs() < 1e-9);
    }
}

#[test]
fn test_late_source_rejected() {
    let err = load_model("tests/fixtures/models/late_source.json").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Model(DependabilityError::InvalidTopology(_))
    ));
}

#[test]
fn test_load_directory_skips_broken_models() {
    let models = loader::load_models("tests/fixtures/models").unwrap();
    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["pump station", "cold spare", "voted motors"]);
}

#[test]
fn test_load_from_temporary_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "name": "tmp",
            "components": [{{ "name": "A", "lambda": 0.5, "mu": 0.25 }}],
            "diagram": [
                {{ "from": "source", "to": ["A"] }},
                {{ "from": "A", "to": ["sink"] }}
            ]
        }}"#
    )
    .unwrap();

    let model = load_model(file.path()).unwrap();
    assert!((model.graph.mttf().unwrap() - 2.0).abs() < 1e-12);
    assert!((model.graph.mttr().unwrap() - 4.0).abs() < 1e-12);
}

#[test]
fn test_model_file_round_trips_through_serde() {
    let text = std::fs::read_to_string("tests/fixtures/models/pump_station.json").unwrap();
    let spec: ModelSpec = serde_json::from_str(&text).unwrap();
    let text = serde_json::to_string(&spec).unwrap();
    let again: ModelSpec = serde_json::from_str(&text).unwrap();

    assert_eq!(again.diagram.len(), spec.diagram.len());
    assert_eq!(again.markov.unwrap().initial, spec.markov.unwrap().initial);
}
