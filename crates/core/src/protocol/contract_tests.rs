use super::*;

#[test]
fn parses_yaml_with_path_glob_dashes() {
    let yaml = r#"
required_outputs:
  - path-glob: "reports/*.rpt"
    non_empty: true
  - path-glob: "reports/summary.txt"
debug_hints:
  - "check the run log"
  - "verify the design restored cleanly"
"#;
    let contract = Contract::from_yaml(yaml).unwrap();
    assert_eq!(contract.required_outputs.len(), 2);
    assert_eq!(contract.required_outputs[0].path_glob, "reports/*.rpt");
    assert!(contract.required_outputs[0].non_empty);
    assert!(!contract.required_outputs[1].non_empty);
    assert_eq!(contract.debug_hints.len(), 2);
}

#[test]
fn round_trips_through_yaml() {
    let contract = Contract {
        required_outputs: vec![RequiredOutput {
            path_glob: "reports/*.log".into(),
            non_empty: true,
        }],
        debug_hints: vec!["a".into(), "b".into()],
    };
    let yaml = contract.to_yaml().unwrap();
    let back = Contract::from_yaml(&yaml).unwrap();
    assert_eq!(contract, back);
}
