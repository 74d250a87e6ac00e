//! Network container: an arena of elements plus their insertion order.

use hf_core::{ElementId, Real};

use crate::builder::NetworkBuilder;
use crate::element::{Element, ElementKind};
use crate::error::{NetworkError, NetworkResult};

/// Ordered collection of hydraulic elements.
///
/// Elements live in an arena indexed by `ElementId`; slots of deleted
/// elements stay empty so handles are never reused. `order` keeps the
/// insertion order of the live elements, which drives source lookup and
/// upstream search.
#[derive(Debug, Clone, Default)]
pub struct Network {
    slots: Vec<Option<Element>>,
    order: Vec<ElementId>,
    capacity_limit: Option<usize>,
}

impl Network {
    /// Create an empty, unbounded network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty network that accepts at most `limit` live elements.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            capacity_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Fluent builder for a new network.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity_limit
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add an element and return its handle.
    pub fn add_element(&mut self, element: Element) -> NetworkResult<ElementId> {
        if let Some(limit) = self.capacity_limit {
            if self.order.len() >= limit {
                return Err(NetworkError::CapacityExceeded { limit });
            }
        }
        Ok(self.push(element))
    }

    pub fn add_source(&mut self, name: impl Into<String>, flow: Real) -> NetworkResult<ElementId> {
        let mut source = Element::source(name);
        source.set_flow(flow);
        self.add_element(source)
    }

    pub fn add_tap(&mut self, name: impl Into<String>, open: bool) -> NetworkResult<ElementId> {
        let mut tap = Element::tap(name);
        tap.set_open(open);
        self.add_element(tap)
    }

    pub fn add_split(&mut self, name: impl Into<String>) -> NetworkResult<ElementId> {
        self.add_element(Element::split(name))
    }

    pub fn add_multisplit(
        &mut self,
        name: impl Into<String>,
        num_outputs: usize,
    ) -> NetworkResult<ElementId> {
        self.add_element(Element::multisplit(name, num_outputs))
    }

    pub fn add_sink(&mut self, name: impl Into<String>) -> NetworkResult<ElementId> {
        self.add_element(Element::sink(name))
    }

    /// Insert without the capacity check.
    pub(crate) fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId::from_index(self.slots.len() as u32);
        self.slots.push(Some(element));
        self.order.push(id);
        id
    }

    /// Take an element out of the arena, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: ElementId) -> NetworkResult<Element> {
        let element = self
            .slots
            .get_mut(id.index() as usize)
            .and_then(Option::take)
            .ok_or(NetworkError::UnknownId { id })?;
        self.order.retain(|&other| other != id);
        Ok(element)
    }

    /// Handles of live elements in insertion order.
    pub fn ids(&self) -> &[ElementId] {
        &self.order
    }

    /// Live elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|element| (id, element)))
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots.get(id.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    fn get_or_err(&self, id: ElementId) -> NetworkResult<&Element> {
        self.get(id).ok_or(NetworkError::UnknownId { id })
    }

    /// First element (in insertion order) with the given name.
    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements()
            .find(|(_, element)| element.name() == name)
            .map(|(id, _)| id)
    }

    /// The source used for simulation: the first one in insertion order.
    pub fn source(&self) -> Option<ElementId> {
        self.elements()
            .find(|(_, element)| element.kind() == ElementKind::Source)
            .map(|(id, _)| id)
    }

    /// Attach `to` downstream of `from` (output 0 for splits).
    pub fn connect(&mut self, from: ElementId, to: ElementId) -> NetworkResult<()> {
        self.get_or_err(to)?;
        let element = self.get_mut(from).ok_or(NetworkError::UnknownId { id: from })?;
        element.connect(to);
        Ok(())
    }

    /// Attach `to` at output `index` of the split/multisplit `from`.
    pub fn connect_at(&mut self, from: ElementId, to: ElementId, index: usize) -> NetworkResult<()> {
        self.get_or_err(to)?;
        let element = self.get_mut(from).ok_or(NetworkError::UnknownId { id: from })?;
        if element.connect_at(to, index) {
            Ok(())
        } else {
            Err(NetworkError::OutputOutOfRange {
                name: element.name().to_string(),
                index,
                len: if element.is_branching() {
                    element.output_slots().len()
                } else {
                    0
                },
            })
        }
    }

    /// First element (in insertion order) with an output slot pointing at
    /// `id`, together with that slot's index.
    pub fn upstream_of(&self, id: ElementId) -> Option<(ElementId, usize)> {
        self.elements()
            .find_map(|(up, element)| element.slot_of(id).map(|slot| (up, slot)))
    }

    /// Live downstream elements of `id`, in output index order.
    pub fn downstream_of(&self, id: ElementId) -> Vec<ElementId> {
        self.get(id)
            .map(|element| {
                element
                    .output_slots()
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|&child| self.get(child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved() {
        let mut net = Network::new();
        let a = net.add_source("A", 1.0).unwrap();
        let b = net.add_tap("B", true).unwrap();
        let c = net.add_sink("C").unwrap();
        assert_eq!(net.ids(), &[a, b, c]);
        let names: Vec<_> = net.elements().map(|(_, e)| e.name()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(net.len(), 3);
    }

    #[test]
    fn capacity_limit_rejects_extra_elements() {
        let mut net = Network::with_capacity_limit(2);
        net.add_source("S", 1.0).unwrap();
        net.add_sink("K").unwrap();
        let err = net.add_sink("K2").unwrap_err();
        assert_eq!(err, NetworkError::CapacityExceeded { limit: 2 });
        assert_eq!(net.len(), 2);
    }

    #[test]
    fn first_source_wins() {
        let mut net = Network::new();
        net.add_sink("K").unwrap();
        let s1 = net.add_source("S1", 1.0).unwrap();
        net.add_source("S2", 2.0).unwrap();
        assert_eq!(net.source(), Some(s1));
    }

    #[test]
    fn no_source() {
        let mut net = Network::new();
        net.add_tap("T", true).unwrap();
        assert_eq!(net.source(), None);
    }

    #[test]
    fn upstream_lookup_reports_slot() {
        let mut net = Network::new();
        let split = net.add_split("S").unwrap();
        let a = net.add_sink("A").unwrap();
        let b = net.add_sink("B").unwrap();
        net.connect_at(split, a, 0).unwrap();
        net.connect_at(split, b, 1).unwrap();
        assert_eq!(net.upstream_of(b), Some((split, 1)));
        assert_eq!(net.upstream_of(split), None);
        assert_eq!(net.downstream_of(split), vec![a, b]);
    }

    #[test]
    fn connect_at_out_of_range() {
        let mut net = Network::new();
        let split = net.add_split("S").unwrap();
        let a = net.add_sink("A").unwrap();
        let err = net.connect_at(split, a, 2).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::OutputOutOfRange { index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn connect_unknown_ids() {
        let mut net = Network::new();
        let a = net.add_tap("A", true).unwrap();
        let bogus = ElementId::from_index(99);
        assert_eq!(
            net.connect(a, bogus),
            Err(NetworkError::UnknownId { id: bogus })
        );
        assert!(net.get(bogus).is_none());
    }

    #[test]
    fn remove_keeps_ids_stable() {
        let mut net = Network::new();
        let a = net.add_tap("A", true).unwrap();
        let b = net.add_tap("B", true).unwrap();
        let c = net.add_tap("C", true).unwrap();
        net.remove(b).unwrap();
        assert_eq!(net.ids(), &[a, c]);
        assert!(net.get(b).is_none());
        assert_eq!(net.get(c).unwrap().name(), "C");
        let d = net.add_sink("D").unwrap();
        assert_ne!(d, b);
    }
}
