use hf_network::{Network, RecordingObserver};
use hf_project::{
    ElementKindDef, NetworkDef, Project, ProjectError, ValidationError, build_network,
    from_yaml_str, load_network,
};

const PROJECT: &str = r#"
version: 1
name: test
networks:
  - id: n1
    name: Net one
    elements:
      - name: S
        kind: { type: Source, flow: 100.0 }
      - name: M
        kind: { type: Multisplit, outputs: 2, proportions: [0.3, 0.7] }
      - name: A
        kind: { type: Sink }
      - name: B
        max_flow: 50.0
        kind: { type: Sink }
    links:
      - { from: S, to: M }
      - { from: M, to: A, output: 0 }
      - { from: M, to: B, output: 1 }
"#;

fn simulate(network: &Network) -> RecordingObserver {
    let mut rec = RecordingObserver::new();
    network.simulate_checked(&mut rec, true);
    rec
}

#[test]
fn parse_and_build() {
    let project = from_yaml_str(PROJECT).unwrap();
    let def = project.network("n1").unwrap();
    assert!(matches!(
        def.elements[1].kind,
        ElementKindDef::Multisplit { outputs: 2, .. }
    ));

    let network = build_network(def).unwrap();
    let rec = simulate(&network);
    let b = rec.flow_of("B").unwrap().input.unwrap();
    assert!((b - 70.0).abs() < 1e-9);
    assert_eq!(rec.errors().count(), 1);
}

#[test]
fn export_round_trip() {
    let project = from_yaml_str(PROJECT).unwrap();
    let original = load_network(&project, "n1").unwrap();

    let exported = NetworkDef::from_network("n1", &original);
    let yaml = serde_yaml::to_string(&Project {
        version: 1,
        name: "exported".into(),
        networks: vec![exported],
    })
    .unwrap();
    let reparsed = from_yaml_str(&yaml).unwrap();
    let rebuilt = load_network(&reparsed, "n1").unwrap();

    assert_eq!(
        simulate(&original).into_notifications(),
        simulate(&rebuilt).into_notifications()
    );
}

#[test]
fn export_after_deletion() {
    let mut network = Network::builder()
        .add_source("S")
        .with_flow(4.0)
        .link_to_tap("T")
        .open()
        .link_to_sink("K")
        .complete();
    network.delete_element("T").unwrap();

    let def = NetworkDef::from_network("after", &network);
    assert_eq!(def.elements.len(), 2);
    assert_eq!(def.links.len(), 1);
    assert_eq!(def.links[0].from, "S");
    assert_eq!(def.links[0].to, "K");
    assert_eq!(def.links[0].output, None);
}

#[test]
fn unknown_network() {
    let project = from_yaml_str(PROJECT).unwrap();
    assert!(matches!(
        load_network(&project, "missing"),
        Err(ProjectError::UnknownNetwork { .. })
    ));
}

#[test]
fn invalid_link_rejected_on_load() {
    let yaml = PROJECT.replace("{ from: M, to: B, output: 1 }", "{ from: M, to: B, output: 5 }");
    assert!(matches!(
        from_yaml_str(&yaml),
        Err(ProjectError::Validation(ValidationError::InvalidValue { .. }))
    ));
}

#[test]
fn capacity_checked_on_load() {
    let yaml = PROJECT.replace("name: Net one", "name: Net one\n    capacity: 3");
    assert!(matches!(
        from_yaml_str(&yaml),
        Err(ProjectError::Validation(_))
    ));
}
