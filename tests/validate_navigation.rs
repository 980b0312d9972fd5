mod helpers;

use flow_modeller::validate::{NavigationGraph, validate_workflow};
use helpers::*;
use serde_json::json;

fn codes(errors: &[flow_modeller::validate::ValidationError]) -> Vec<&'static str> {
    errors.iter().map(|e| e.code).collect()
}

#[test]
fn default_navigation_is_always_valid() {
    for (n, m) in [(1, 0), (3, 0), (2, 2), (4, 1)] {
        let chain = (m > 0).then(|| chain_tasks(m));
        let executable = compile_flow("sound", flow_doc("sound", linear_tasks(n), chain)).unwrap();
        let errors = validate_workflow(executable.workflow().unwrap());
        assert!(errors.is_empty(), "n={} m={}: {:?}", n, m, errors);
    }
}

#[test]
fn unknown_target_is_flagged() {
    let tasks = json!({
        "T1": {"do": {"ns.op1": {}}, "navigate": {"SUCCESS": "T3", "FAILURE": "FAILURE"}},
        "T2": {"do": {"ns.op2": {}}}
    });
    let executable = compile_flow("typo", flow_doc("typo", tasks, None)).unwrap();
    let errors = validate_workflow(executable.workflow().unwrap());
    assert_eq!(codes(&errors), vec!["V001", "V002"]);
    assert_eq!(errors[1].task.as_deref(), Some("T2"));
}

#[test]
fn skipped_task_is_unreachable() {
    let tasks = json!({
        "T1": {"do": {"ns.op1": {}}, "navigate": {"SUCCESS": "T3", "FAILURE": "FAILURE"}},
        "T2": {"do": {"ns.op2": {}}},
        "T3": {"do": {"ns.op3": {}}}
    });
    let executable = compile_flow("skip", flow_doc("skip", tasks, None)).unwrap();
    let errors = validate_workflow(executable.workflow().unwrap());
    assert_eq!(codes(&errors), vec!["V002"]);
    assert!(errors[0].message.contains("'T2'"));
}

#[test]
fn error_chain_bypassed_by_authored_navigation_is_unreachable() {
    let tasks = json!({
        "T1": {"do": {"ns.op1": {}}, "navigate": {"SUCCESS": "SUCCESS", "FAILURE": "FAILURE"}}
    });
    let executable = compile_flow("bypass", flow_doc("bypass", tasks, Some(chain_tasks(1)))).unwrap();
    let errors = validate_workflow(executable.workflow().unwrap());
    assert_eq!(codes(&errors), vec!["V002"]);
    assert_eq!(errors[0].task.as_deref(), Some("R1"));
}

#[test]
fn label_missing_from_authored_navigation_is_flagged() {
    let tasks = json!({"T1": {"do": {"ns.op1": {}}, "navigate": {"FAILURE": "FAILURE"}}});
    let executable = compile_flow("half", flow_doc("half", tasks, None)).unwrap();
    let errors = validate_workflow(executable.workflow().unwrap());
    assert_eq!(codes(&errors), vec!["V003"]);
    assert!(errors[0].to_string().starts_with("[V003]"));
}

#[test]
fn graph_has_a_node_per_task_and_reached_terminal() {
    let executable = compile_flow("g", flow_doc("g", linear_tasks(2), Some(chain_tasks(1)))).unwrap();
    let graph = NavigationGraph::build(executable.workflow().unwrap());

    // T1, T2, R1, SUCCESS, FAILURE
    assert_eq!(graph.graph.node_count(), 5);
    assert_eq!(graph.graph.edge_count(), 6);
    assert_eq!(graph.incoming_count("R1"), 2);
    assert_eq!(graph.incoming_count("SUCCESS"), 1);

    let mut successors = graph.successors("T1");
    successors.sort();
    assert_eq!(successors, vec![("FAILURE", "R1"), ("SUCCESS", "T2")]);
}
