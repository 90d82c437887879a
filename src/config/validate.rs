// src/config/validate.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{MAX_TICK_INTERVAL, RawWorkflowFile, WorkflowFile, parse_duration};
use crate::errors::{FlowdagError, Result};
use crate::types::{EdgeKind, JobId};

impl TryFrom<RawWorkflowFile> for WorkflowFile {
    type Error = crate::errors::FlowdagError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(WorkflowFile::new_unchecked(raw.config, raw.workflow, raw.node))
    }
}

/// Run every semantic check on a raw workflow file.
pub fn validate_config(cfg: &RawWorkflowFile) -> Result<()> {
    validate_coordinator(cfg)?;
    validate_edges(cfg)?;
    validate_jobs(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn validate_coordinator(cfg: &RawWorkflowFile) -> Result<()> {
    let interval = parse_duration(&cfg.config.tick_interval).map_err(|e| {
        FlowdagError::ConfigError(format!("[config].tick_interval: {e}"))
    })?;

    if interval.is_zero() {
        return Err(FlowdagError::ConfigError(
            "[config].tick_interval must be greater than zero".to_string(),
        ));
    }

    if interval > MAX_TICK_INTERVAL {
        return Err(FlowdagError::ConfigError(format!(
            "[config].tick_interval must be at most {:?}",
            MAX_TICK_INTERVAL
        )));
    }

    Ok(())
}

fn validate_edges(cfg: &RawWorkflowFile) -> Result<()> {
    for (name, node) in cfg.node.iter() {
        for (kind, targets) in [
            (EdgeKind::Success, &node.success),
            (EdgeKind::Failure, &node.failure),
            (EdgeKind::Always, &node.always),
        ] {
            for target in targets {
                if !cfg.node.contains_key(target) {
                    return Err(FlowdagError::ConfigError(format!(
                        "node '{}' has unknown {} target '{}'",
                        name, kind, target
                    )));
                }
                if target == name {
                    return Err(FlowdagError::ConfigError(format!(
                        "node '{}' cannot point at itself in `{}`",
                        name, kind
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_jobs(cfg: &RawWorkflowFile) -> Result<()> {
    let mut owners: HashMap<JobId, &str> = HashMap::new();

    for (name, node) in cfg.node.iter() {
        if let Some(job) = node.job {
            if let Some(other) = owners.insert(job.id, name.as_str()) {
                return Err(FlowdagError::ConfigError(format!(
                    "job id {} is attached to both '{}' and '{}'",
                    job.id, other, name
                )));
            }
        }

        if let Some(outcome) = node.simulate {
            if !outcome.is_finished() {
                return Err(FlowdagError::ConfigError(format!(
                    "node '{}': simulate must be a finished status (got '{}')",
                    name, outcome
                )));
            }
        }
    }

    Ok(())
}

fn validate_dag(cfg: &RawWorkflowFile) -> Result<()> {
    // Edge direction: node -> related node, regardless of edge kind.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.node.keys() {
        graph.add_node(name.as_str());
    }

    for (name, node) in cfg.node.iter() {
        for target in node.success.iter().chain(&node.failure).chain(&node.always) {
            graph.add_edge(name.as_str(), target.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(FlowdagError::DagCycle(format!(
                "cycle detected in workflow graph involving node '{}'",
                node
            )))
        }
    }
}
