//! Conversion between project definitions and live networks.

use std::collections::HashMap;

use hf_network::{Element, ElementKind, Network, Variant};

use crate::ProjectResult;
use crate::schema::{ElementDef, ElementKindDef, LinkDef, NetworkDef};
use crate::validate::validate_network;

/// Validate `def` and assemble the network it describes.
pub fn build_network(def: &NetworkDef) -> ProjectResult<Network> {
    validate_network(def)?;

    let mut network = match def.capacity {
        Some(limit) => Network::with_capacity_limit(limit),
        None => Network::new(),
    };

    let mut ids = HashMap::new();
    for element_def in &def.elements {
        let id = network.add_element(element_from_def(element_def))?;
        ids.insert(element_def.name.as_str(), id);
    }

    for link in &def.links {
        // Both ends exist: validation checked every link.
        let (Some(&from), Some(&to)) = (ids.get(link.from.as_str()), ids.get(link.to.as_str()))
        else {
            continue;
        };
        match link.output {
            Some(index) if index > 0 => network.connect_at(from, to, index)?,
            _ => network.connect(from, to)?,
        }
    }

    tracing::debug!(
        network = def.id.as_str(),
        elements = network.len(),
        "network built"
    );
    Ok(network)
}

fn element_from_def(def: &ElementDef) -> Element {
    let mut element = match &def.kind {
        ElementKindDef::Source { flow } => {
            let mut source = Element::source(&def.name);
            source.set_flow(*flow);
            source
        }
        ElementKindDef::Tap { open } => {
            let mut tap = Element::tap(&def.name);
            tap.set_open(*open);
            tap
        }
        ElementKindDef::Split => Element::split(&def.name),
        ElementKindDef::Multisplit {
            outputs,
            proportions,
        } => {
            let mut multi = Element::multisplit(&def.name, *outputs);
            if let Some(proportions) = proportions {
                multi.set_proportions(proportions);
            }
            multi
        }
        ElementKindDef::Sink => Element::sink(&def.name),
    };
    if let Some(max_flow) = def.max_flow {
        element.set_max_flow(max_flow);
    }
    element
}

impl NetworkDef {
    /// Describe a live network. Links are recorded by element name, so
    /// networks with duplicate names do not survive a round trip.
    pub fn from_network(id: impl Into<String>, network: &Network) -> Self {
        let id = id.into();
        let elements = network
            .elements()
            .map(|(_, element)| ElementDef {
                name: element.name().to_string(),
                max_flow: element.max_flow(),
                kind: kind_def(element),
            })
            .collect();

        let mut links = Vec::new();
        for (_, element) in network.elements() {
            for (index, slot) in element.output_slots().iter().enumerate() {
                let Some(target) = slot.and_then(|target| network.get(target)) else {
                    continue;
                };
                links.push(LinkDef {
                    from: element.name().to_string(),
                    to: target.name().to_string(),
                    output: element.is_branching().then_some(index),
                });
            }
        }

        Self {
            name: id.clone(),
            id,
            capacity: network.capacity_limit(),
            elements,
            links,
        }
    }
}

fn kind_def(element: &Element) -> ElementKindDef {
    match element.variant() {
        Variant::Source { flow, .. } => ElementKindDef::Source { flow: *flow },
        Variant::Tap { open, .. } => ElementKindDef::Tap { open: *open },
        Variant::Split { .. } => ElementKindDef::Split,
        Variant::Multisplit {
            outputs,
            proportions,
        } => ElementKindDef::Multisplit {
            outputs: outputs.len(),
            proportions: Some(proportions.clone()),
        },
        Variant::Sink => ElementKindDef::Sink,
    }
}

/// Kind of a definition, as reported by the network once built.
pub fn element_kind(def: &ElementKindDef) -> ElementKind {
    match def {
        ElementKindDef::Source { .. } => ElementKind::Source,
        ElementKindDef::Tap { .. } => ElementKind::Tap,
        ElementKindDef::Split => ElementKind::Split,
        ElementKindDef::Multisplit { .. } => ElementKind::Multisplit,
        ElementKindDef::Sink => ElementKind::Sink,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multisplit_defaults_to_equal_shares() {
        let def = ElementDef {
            name: "M".into(),
            max_flow: None,
            kind: ElementKindDef::Multisplit {
                outputs: 4,
                proportions: None,
            },
        };
        let element = element_from_def(&def);
        assert_eq!(element.proportions(), Some(&[0.25; 4][..]));
        assert_eq!(element_kind(&def.kind), element.kind());
    }

    #[test]
    fn max_flow_applied() {
        let def = ElementDef {
            name: "K".into(),
            max_flow: Some(3.0),
            kind: ElementKindDef::Sink,
        };
        assert_eq!(element_from_def(&def).max_flow(), Some(3.0));
    }
}
