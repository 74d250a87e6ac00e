//! Project validation logic.

use std::collections::{HashMap, HashSet};

use hf_core::{Tolerances, ensure_non_negative, nearly_equal};
use tracing::warn;

use crate::schema::{ElementDef, ElementKindDef, NetworkDef, Project};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut network_ids = HashSet::new();
    for network in &project.networks {
        if !network_ids.insert(&network.id) {
            return Err(ValidationError::DuplicateId {
                id: network.id.clone(),
                context: "networks".to_string(),
            });
        }
        validate_network(network)?;
    }

    Ok(())
}

pub fn validate_network(network: &NetworkDef) -> Result<(), ValidationError> {
    if let Some(capacity) = network.capacity {
        if network.elements.len() > capacity {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.capacity", network.id),
                value: capacity.to_string(),
                reason: format!("network declares {} elements", network.elements.len()),
            });
        }
    }

    let mut elements: HashMap<&str, &ElementDef> = HashMap::new();
    for element in &network.elements {
        if elements.insert(element.name.as_str(), element).is_some() {
            return Err(ValidationError::DuplicateId {
                id: element.name.clone(),
                context: format!("network {} elements", network.id),
            });
        }
        validate_element(element)?;
    }

    let context = format!("network {} links", network.id);
    let mut used_slots = HashSet::new();
    let mut fed = HashSet::new();
    for link in &network.links {
        let from = elements
            .get(link.from.as_str())
            .ok_or_else(|| ValidationError::MissingReference {
                id: link.from.clone(),
                context: context.clone(),
            })?;
        if !elements.contains_key(link.to.as_str()) {
            return Err(ValidationError::MissingReference {
                id: link.to.clone(),
                context: context.clone(),
            });
        }
        if link.from == link.to {
            return Err(invalid_link(link.from.as_str(), "element linked to itself"));
        }

        let output = link.output.unwrap_or(0);
        let outputs = output_count(&from.kind);
        if outputs == 0 {
            return Err(invalid_link(&link.from, "sinks have no outputs"));
        }
        if output >= outputs {
            return Err(ValidationError::InvalidValue {
                field: format!("{} -> {}.output", link.from, link.to),
                value: output.to_string(),
                reason: format!("{} has {} outputs", link.from, outputs),
            });
        }
        if !used_slots.insert((link.from.as_str(), output)) {
            return Err(ValidationError::DuplicateId {
                id: format!("{}[{}]", link.from, output),
                context: context.clone(),
            });
        }
        if !fed.insert(link.to.as_str()) {
            return Err(invalid_link(&link.to, "element has more than one upstream"));
        }
    }

    Ok(())
}

fn validate_element(element: &ElementDef) -> Result<(), ValidationError> {
    if let Some(max_flow) = element.max_flow {
        check_non_negative(&element.name, "max_flow", max_flow)?;
    }

    match &element.kind {
        ElementKindDef::Source { flow } => check_non_negative(&element.name, "flow", *flow)?,
        ElementKindDef::Multisplit {
            outputs,
            proportions,
        } => {
            if *outputs == 0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.outputs", element.name),
                    value: "0".to_string(),
                    reason: "a multisplit needs at least one output".to_string(),
                });
            }
            if let Some(proportions) = proportions {
                if proportions.len() != *outputs {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{}.proportions", element.name),
                        value: format!("{proportions:?}"),
                        reason: format!("expected {outputs} proportions"),
                    });
                }
                for &p in proportions {
                    check_non_negative(&element.name, "proportions", p)?;
                }
                let sum: f64 = proportions.iter().sum();
                let tol = Tolerances {
                    abs: 1e-9,
                    rel: 1e-9,
                };
                if !nearly_equal(sum, 1.0, tol) {
                    warn!(
                        element = element.name.as_str(),
                        sum, "multisplit proportions do not sum to 1.0"
                    );
                }
            }
        }
        ElementKindDef::Tap { .. } | ElementKindDef::Split | ElementKindDef::Sink => {}
    }

    Ok(())
}

fn output_count(kind: &ElementKindDef) -> usize {
    match kind {
        ElementKindDef::Source { .. } | ElementKindDef::Tap { .. } => 1,
        ElementKindDef::Split => 2,
        ElementKindDef::Multisplit { outputs, .. } => *outputs,
        ElementKindDef::Sink => 0,
    }
}

fn check_non_negative(element: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    ensure_non_negative(value, field)
        .map(|_| ())
        .map_err(|err| ValidationError::InvalidValue {
            field: format!("{element}.{field}"),
            value: value.to_string(),
            reason: err.to_string(),
        })
}

fn invalid_link(name: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: format!("{name} link"),
        value: name.to_string(),
        reason: reason.to_string(),
    }
}
