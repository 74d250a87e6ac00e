//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub networks: Vec<NetworkDef>,
}

impl Project {
    pub fn network(&self, id: &str) -> Option<&NetworkDef> {
        self.networks.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub id: String,
    pub name: String,
    /// Maximum number of elements; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow: Option<f64>,
    pub kind: ElementKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ElementKindDef {
    Source {
        #[serde(default)]
        flow: f64,
    },
    Tap {
        #[serde(default)]
        open: bool,
    },
    Split,
    Multisplit {
        outputs: usize,
        /// Equal shares when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proportions: Option<Vec<f64>>,
    },
    Sink,
}

/// Downstream link. `output` selects the split/multisplit output (default 0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<usize>,
}
