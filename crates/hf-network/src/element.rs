//! Hydraulic elements and their per-variant flow rules.

use std::fmt;

use hf_core::{ElementId, Real};
use serde::{Deserialize, Serialize};

/// Type tag of an element, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Source,
    Tap,
    Split,
    Multisplit,
    Sink,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Source => "Source",
            ElementKind::Tap => "Tap",
            ElementKind::Split => "Split",
            ElementKind::Multisplit => "Multisplit",
            ElementKind::Sink => "Sink",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific state. Output slots hold handles of downstream elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    /// Root of the network; `flow` is what it delivers downstream.
    Source {
        flow: Real,
        output: Option<ElementId>,
    },
    /// Gate that passes its input when open and blocks it when closed.
    Tap {
        open: bool,
        output: Option<ElementId>,
    },
    /// Halves its input across two outputs.
    Split { outputs: [Option<ElementId>; 2] },
    /// Distributes its input by `proportions`, one entry per output.
    Multisplit {
        outputs: Vec<Option<ElementId>>,
        proportions: Vec<Real>,
    },
    /// Terminal element.
    Sink,
}

/// A named element of a hydraulic network.
///
/// The element does not know its own handle: handles are assigned by the
/// `Network` arena on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    max_flow: Option<Real>,
    variant: Variant,
}

impl Element {
    fn new(name: impl Into<String>, variant: Variant) -> Self {
        Self {
            name: name.into(),
            max_flow: None,
            variant,
        }
    }

    /// Source delivering no flow until `set_flow` is called.
    pub fn source(name: impl Into<String>) -> Self {
        Self::new(
            name,
            Variant::Source {
                flow: 0.0,
                output: None,
            },
        )
    }

    /// Tap, initially closed.
    pub fn tap(name: impl Into<String>) -> Self {
        Self::new(
            name,
            Variant::Tap {
                open: false,
                output: None,
            },
        )
    }

    pub fn split(name: impl Into<String>) -> Self {
        Self::new(name, Variant::Split { outputs: [None; 2] })
    }

    /// Multisplit with `num_outputs` outputs sharing the input equally.
    pub fn multisplit(name: impl Into<String>, num_outputs: usize) -> Self {
        let share = if num_outputs == 0 {
            0.0
        } else {
            1.0 / num_outputs as Real
        };
        Self::new(
            name,
            Variant::Multisplit {
                outputs: vec![None; num_outputs],
                proportions: vec![share; num_outputs],
            },
        )
    }

    pub fn sink(name: impl Into<String>) -> Self {
        Self::new(name, Variant::Sink)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        match self.variant {
            Variant::Source { .. } => ElementKind::Source,
            Variant::Tap { .. } => ElementKind::Tap,
            Variant::Split { .. } => ElementKind::Split,
            Variant::Multisplit { .. } => ElementKind::Multisplit,
            Variant::Sink => ElementKind::Sink,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// True for splits and multisplits.
    pub fn is_branching(&self) -> bool {
        matches!(
            self.variant,
            Variant::Split { .. } | Variant::Multisplit { .. }
        )
    }

    /// Overflow threshold; `None` means unlimited.
    pub fn max_flow(&self) -> Option<Real> {
        self.max_flow
    }

    /// Set the overflow threshold. A source has no input, so this is a no-op there.
    pub fn set_max_flow(&mut self, threshold: Real) {
        if !matches!(self.variant, Variant::Source { .. }) {
            self.max_flow = Some(threshold);
        }
    }

    pub fn flow(&self) -> Option<Real> {
        match self.variant {
            Variant::Source { flow, .. } => Some(flow),
            _ => None,
        }
    }

    /// No-op unless this is a source.
    pub fn set_flow(&mut self, value: Real) {
        if let Variant::Source { flow, .. } = &mut self.variant {
            *flow = value;
        }
    }

    pub fn is_open(&self) -> Option<bool> {
        match self.variant {
            Variant::Tap { open, .. } => Some(open),
            _ => None,
        }
    }

    /// No-op unless this is a tap.
    pub fn set_open(&mut self, value: bool) {
        if let Variant::Tap { open, .. } = &mut self.variant {
            *open = value;
        }
    }

    pub fn proportions(&self) -> Option<&[Real]> {
        match &self.variant {
            Variant::Multisplit { proportions, .. } => Some(proportions),
            _ => None,
        }
    }

    /// Replace the proportions of a multisplit.
    ///
    /// Returns `false` (leaving the element unchanged) when this is not a
    /// multisplit or the length differs from the number of outputs. The sum is
    /// not checked.
    pub fn set_proportions(&mut self, values: &[Real]) -> bool {
        match &mut self.variant {
            Variant::Multisplit {
                outputs,
                proportions,
            } if outputs.len() == values.len() => {
                proportions.copy_from_slice(values);
                true
            }
            _ => false,
        }
    }

    /// Output slots, in index order. Empty for a sink.
    pub fn output_slots(&self) -> &[Option<ElementId>] {
        match &self.variant {
            Variant::Source { output, .. } | Variant::Tap { output, .. } => {
                std::slice::from_ref(output)
            }
            Variant::Split { outputs } => outputs,
            Variant::Multisplit { outputs, .. } => outputs,
            Variant::Sink => &[],
        }
    }

    /// Copy of the output slots.
    pub fn outputs(&self) -> Vec<Option<ElementId>> {
        self.output_slots().to_vec()
    }

    /// The single downstream element; for splits this is output 0.
    pub fn output(&self) -> Option<ElementId> {
        self.output_slots().first().copied().flatten()
    }

    pub fn connected_outputs(&self) -> usize {
        self.output_slots().iter().flatten().count()
    }

    /// First connected output, in index order.
    pub fn first_connected(&self) -> Option<ElementId> {
        self.output_slots().iter().flatten().next().copied()
    }

    /// Index of the slot that points at `target`, if any.
    pub fn slot_of(&self, target: ElementId) -> Option<usize> {
        self.output_slots()
            .iter()
            .position(|slot| *slot == Some(target))
    }

    /// Attach `target` downstream. Splits attach at output 0; sinks ignore it.
    pub fn connect(&mut self, target: ElementId) {
        self.set_slot(0, Some(target));
    }

    /// Attach `target` at output `index`.
    ///
    /// Only meaningful for splits and multisplits; returns `false` without
    /// changing anything for other variants or an out-of-range index.
    pub fn connect_at(&mut self, target: ElementId, index: usize) -> bool {
        self.is_branching() && self.set_slot(index, Some(target))
    }

    /// Clear output `index`. Returns `false` if the slot does not exist.
    pub fn disconnect_at(&mut self, index: usize) -> bool {
        self.set_slot(index, None)
    }

    pub(crate) fn set_slot(&mut self, index: usize, target: Option<ElementId>) -> bool {
        let slot = match &mut self.variant {
            Variant::Source { output, .. } | Variant::Tap { output, .. } => {
                (index == 0).then_some(output)
            }
            Variant::Split { outputs } => outputs.get_mut(index),
            Variant::Multisplit { outputs, .. } => outputs.get_mut(index),
            Variant::Sink => None,
        };
        match slot {
            Some(slot) => {
                *slot = target;
                true
            }
            None => false,
        }
    }

    /// Flow leaving through output `index` for the given input flow.
    ///
    /// A source ignores `input`. Unconnected slots are not special-cased here:
    /// this answers "what would a downstream element on this slot receive".
    pub fn slot_flow(&self, input: Real, index: usize) -> Real {
        match &self.variant {
            Variant::Source { flow, .. } => *flow,
            Variant::Tap { open, .. } => {
                if *open {
                    input
                } else {
                    0.0
                }
            }
            Variant::Split { .. } => input / 2.0,
            Variant::Multisplit { proportions, .. } => {
                proportions.get(index).map_or(0.0, |p| input * p)
            }
            Variant::Sink => 0.0,
        }
    }

    /// Per-output flows reported to observers; `None` for a sink.
    ///
    /// Unconnected split/multisplit outputs report zero.
    pub fn output_flows(&self, input: Real) -> Option<Vec<Real>> {
        match &self.variant {
            Variant::Sink => None,
            Variant::Source { .. } | Variant::Tap { .. } => Some(vec![self.slot_flow(input, 0)]),
            Variant::Split { outputs } => Some(self.branch_flows(input, outputs)),
            Variant::Multisplit { outputs, .. } => Some(self.branch_flows(input, outputs)),
        }
    }

    fn branch_flows(&self, input: Real, outputs: &[Option<ElementId>]) -> Vec<Real> {
        outputs
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(_) => self.slot_flow(input, i),
                None => 0.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> ElementId {
        ElementId::from_index(i)
    }

    #[test]
    fn defaults() {
        assert_eq!(Element::source("s").flow(), Some(0.0));
        assert_eq!(Element::tap("t").is_open(), Some(false));
        assert_eq!(
            Element::multisplit("m", 4).proportions(),
            Some(&[0.25, 0.25, 0.25, 0.25][..])
        );
        assert_eq!(Element::sink("k").max_flow(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Element::multisplit("m", 3).kind().to_string(), "Multisplit");
        assert_eq!(ElementKind::Tap.as_str(), "Tap");
    }

    #[test]
    fn split_connect_uses_first_output() {
        let mut split = Element::split("s");
        split.connect(id(3));
        assert_eq!(split.outputs(), vec![Some(id(3)), None]);
        assert_eq!(split.output(), Some(id(3)));
    }

    #[test]
    fn connect_at_out_of_range_is_noop() {
        let mut split = Element::split("s");
        assert!(!split.connect_at(id(1), 2));
        assert_eq!(split.connected_outputs(), 0);

        let mut multi = Element::multisplit("m", 3);
        assert!(multi.connect_at(id(1), 2));
        assert!(!multi.connect_at(id(2), 3));
        assert_eq!(multi.outputs(), vec![None, None, Some(id(1))]);
    }

    #[test]
    fn connect_at_requires_branching_element() {
        let mut tap = Element::tap("t");
        assert!(!tap.connect_at(id(1), 0));
        assert_eq!(tap.output(), None);
    }

    #[test]
    fn tap_connect_replaces_link() {
        let mut tap = Element::tap("t");
        tap.connect(id(1));
        tap.connect(id(2));
        assert_eq!(tap.output(), Some(id(2)));
    }

    #[test]
    fn sink_ignores_connect() {
        let mut sink = Element::sink("k");
        sink.connect(id(1));
        assert_eq!(sink.output(), None);
        assert!(sink.outputs().is_empty());
    }

    #[test]
    fn source_ignores_max_flow() {
        let mut source = Element::source("s");
        source.set_max_flow(1.0);
        assert_eq!(source.max_flow(), None);

        let mut tap = Element::tap("t");
        tap.set_max_flow(1.0);
        assert_eq!(tap.max_flow(), Some(1.0));
    }

    #[test]
    fn wrong_variant_setters_are_noops() {
        let mut tap = Element::tap("t");
        tap.set_flow(10.0);
        assert_eq!(tap.flow(), None);
        assert!(!tap.set_proportions(&[1.0]));

        let mut source = Element::source("s");
        source.set_open(true);
        assert_eq!(source.is_open(), None);
    }

    #[test]
    fn proportions_length_must_match() {
        let mut multi = Element::multisplit("m", 2);
        assert!(!multi.set_proportions(&[0.2, 0.3, 0.5]));
        assert_eq!(multi.proportions(), Some(&[0.5, 0.5][..]));
        // Sum is deliberately left unchecked.
        assert!(multi.set_proportions(&[0.9, 0.9]));
        assert_eq!(multi.proportions(), Some(&[0.9, 0.9][..]));
    }

    #[test]
    fn outputs_is_a_copy() {
        let mut split = Element::split("s");
        let mut copy = split.outputs();
        copy[1] = Some(id(9));
        assert_eq!(split.outputs(), vec![None, None]);
        split.connect_at(id(4), 1);
        assert_eq!(split.slot_of(id(4)), Some(1));
    }

    #[test]
    fn flow_rules() {
        let mut tap = Element::tap("t");
        assert_eq!(tap.output_flows(8.0), Some(vec![0.0]));
        tap.set_open(true);
        assert_eq!(tap.output_flows(8.0), Some(vec![8.0]));

        let mut split = Element::split("s");
        split.connect_at(id(1), 1);
        assert_eq!(split.output_flows(8.0), Some(vec![0.0, 4.0]));

        let mut multi = Element::multisplit("m", 2);
        multi.set_proportions(&[0.3, 0.7]);
        multi.connect_at(id(1), 0);
        multi.connect_at(id(2), 1);
        assert_eq!(multi.output_flows(100.0), Some(vec![30.0, 70.0]));

        assert_eq!(Element::sink("k").output_flows(5.0), None);

        let mut source = Element::source("s");
        source.set_flow(20.0);
        assert_eq!(source.output_flows(Real::NAN), Some(vec![20.0]));
    }

    #[test]
    fn disconnect_clears_slot() {
        let mut split = Element::split("s");
        split.connect_at(id(1), 0);
        split.connect_at(id(2), 1);
        assert!(split.disconnect_at(0));
        assert_eq!(split.first_connected(), Some(id(2)));
        assert!(!split.disconnect_at(5));
    }
}
