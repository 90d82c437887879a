#![allow(dead_code)]

pub use flowdag_test_utils::builders;
pub use flowdag_test_utils::init_tracing;

use flowdag::dag::WorkflowNode;

/// Ids of the given nodes, in order.
pub fn ids(nodes: Vec<&WorkflowNode>) -> Vec<&str> {
    nodes.into_iter().map(|n| n.id.as_str()).collect()
}
