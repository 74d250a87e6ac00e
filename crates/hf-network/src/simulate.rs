//! Flow propagation from the source outward.
//!
//! The topology only stores downstream links, so the input of an element is
//! found by searching for its upstream element and resolving that element's
//! own input first. Resolved inputs are memoized per pass.

use std::collections::{HashMap, HashSet};

use hf_core::{ElementId, Real};
use tracing::{debug, trace};

use crate::element::ElementKind;
use crate::network::Network;
use crate::observer::SimulationObserver;

/// Per-run simulation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Compare each element's input against its threshold and report overflows.
    pub check_max_flow: bool,
}

impl SimulationOptions {
    pub fn checked() -> Self {
        Self {
            check_max_flow: true,
        }
    }
}

impl Network {
    /// Run an unchecked simulation pass.
    pub fn simulate<O: SimulationObserver + ?Sized>(&self, observer: &mut O) {
        self.simulate_with(observer, SimulationOptions::default());
    }

    /// Run a simulation pass, optionally checking thresholds.
    pub fn simulate_checked<O: SimulationObserver + ?Sized>(
        &self,
        observer: &mut O,
        check_max_flow: bool,
    ) {
        self.simulate_with(observer, SimulationOptions { check_max_flow });
    }

    /// Run a simulation pass with explicit options.
    ///
    /// Does nothing if the network has no source. Never mutates the network.
    pub fn simulate_with<O: SimulationObserver + ?Sized>(
        &self,
        observer: &mut O,
        options: SimulationOptions,
    ) {
        let Some(source) = self.source() else {
            debug!("no source in network, nothing to simulate");
            return;
        };

        let mut pass = FlowPass::new(self, options);
        debug!(
            elements = self.len(),
            check_max_flow = options.check_max_flow,
            "simulation started"
        );
        pass.visit(source, observer);
        debug!(visited = pass.visited.len(), "simulation finished");
    }

    /// Input flow of every element reachable from the source, by handle.
    ///
    /// Same resolution as `simulate`, without an observer. The source maps to
    /// `None`.
    pub fn input_flows(&self) -> HashMap<ElementId, Option<Real>> {
        let mut flows = HashMap::new();
        let Some(source) = self.source() else {
            return flows;
        };
        let mut pass = FlowPass::new(self, SimulationOptions::default());
        let mut stack = vec![source];
        while let Some(id) = stack.pop() {
            if flows.contains_key(&id) {
                continue;
            }
            let input = pass.resolve_input(id);
            flows.insert(id, input);
            stack.extend(self.downstream_of(id));
        }
        flows
    }
}

/// State of a single simulation pass.
struct FlowPass<'n> {
    network: &'n Network,
    options: SimulationOptions,
    /// Memoized input flow per element.
    inputs: HashMap<ElementId, Real>,
    /// Elements already notified in this pass.
    visited: HashSet<ElementId>,
}

impl<'n> FlowPass<'n> {
    fn new(network: &'n Network, options: SimulationOptions) -> Self {
        Self {
            network,
            options,
            inputs: HashMap::new(),
            visited: HashSet::new(),
        }
    }

    /// Pre-order visit: notify this element, then its outputs in index order.
    fn visit<O: SimulationObserver + ?Sized>(&mut self, id: ElementId, observer: &mut O) {
        if !self.visited.insert(id) {
            return;
        }
        let network = self.network;
        let Some(element) = network.get(id) else {
            return;
        };

        let kind = element.kind();
        let input = self.resolve_input(id);
        let outputs = element.output_flows(input.unwrap_or(0.0));

        if self.options.check_max_flow {
            if let (Some(actual), Some(threshold)) = (input, element.max_flow()) {
                if actual > threshold {
                    debug!(
                        element = element.name(),
                        actual, threshold, "input flow exceeds threshold"
                    );
                    observer.notify_flow_error(kind, element.name(), actual, threshold);
                }
            }
        }

        trace!(element = element.name(), %kind, ?input, ?outputs, "flow");
        observer.notify_flow(kind, element.name(), input, outputs.as_deref());

        for child in element.output_slots().iter().flatten().copied() {
            self.visit(child, observer);
        }
    }

    fn resolve_input(&mut self, id: ElementId) -> Option<Real> {
        match self.network.get(id)?.kind() {
            ElementKind::Source => None,
            _ => Some(self.input_flow(id)),
        }
    }

    /// Flow delivered to `id` by its upstream element; zero without one.
    fn input_flow(&mut self, id: ElementId) -> Real {
        if let Some(&flow) = self.inputs.get(&id) {
            return flow;
        }
        // Provisional entry so that revisiting `id` during its own
        // resolution terminates.
        self.inputs.insert(id, 0.0);

        let flow = match self.network.upstream_of(id) {
            Some((upstream, slot)) => self.slot_flow(upstream, slot),
            None => 0.0,
        };
        self.inputs.insert(id, flow);
        flow
    }

    /// Flow leaving `id` through output `slot`.
    fn slot_flow(&mut self, id: ElementId, slot: usize) -> Real {
        let network = self.network;
        let Some(element) = network.get(id) else {
            return 0.0;
        };
        let input = match element.kind() {
            ElementKind::Source => 0.0,
            _ => self.input_flow(id),
        };
        element.slot_flow(input, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;

    #[test]
    fn empty_network_is_silent() {
        let net = Network::new();
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        assert!(rec.notifications().is_empty());
    }

    #[test]
    fn lone_source_reports_flow() {
        let mut net = Network::new();
        net.add_source("S", 7.5).unwrap();
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        let n = rec.flow_of("S").unwrap();
        assert_eq!(n.kind, ElementKind::Source);
        assert_eq!(n.input, None);
        assert_eq!(n.outputs, Some(vec![7.5]));
    }

    #[test]
    fn unreached_elements_are_not_notified() {
        let mut net = Network::new();
        let s = net.add_source("S", 4.0).unwrap();
        let k = net.add_sink("K").unwrap();
        net.add_sink("Orphan").unwrap();
        net.connect(s, k).unwrap();
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        assert_eq!(rec.visit_order(), ["S", "K"]);
    }

    #[test]
    fn dangling_slot_is_skipped() {
        let mut net = Network::new();
        let s = net.add_source("S", 4.0).unwrap();
        net.get_mut(s).unwrap().connect(ElementId::from_index(42));
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        assert_eq!(rec.visit_order(), ["S"]);
    }

    #[test]
    fn cycle_terminates() {
        let mut net = Network::new();
        let s = net.add_source("S", 4.0).unwrap();
        let a = net.add_tap("A", true).unwrap();
        let b = net.add_tap("B", true).unwrap();
        net.connect(s, a).unwrap();
        net.connect(a, b).unwrap();
        net.connect(b, a).unwrap();
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        assert_eq!(rec.visit_order(), ["S", "A", "B"]);
    }

    #[test]
    fn unchecked_pass_ignores_thresholds() {
        let mut net = Network::new();
        let s = net.add_source("S", 10.0).unwrap();
        let k = net.add_sink("K").unwrap();
        net.get_mut(k).unwrap().set_max_flow(1.0);
        net.connect(s, k).unwrap();
        let mut rec = RecordingObserver::new();
        net.simulate(&mut rec);
        assert_eq!(rec.errors().count(), 0);
        net.simulate_with(&mut rec, SimulationOptions::checked());
        assert_eq!(rec.errors().count(), 1);
    }

    #[test]
    fn input_flows_match_simulation() {
        let mut net = Network::new();
        let s = net.add_source("S", 12.0).unwrap();
        let split = net.add_split("P").unwrap();
        let a = net.add_sink("A").unwrap();
        net.connect(s, split).unwrap();
        net.connect_at(split, a, 1).unwrap();
        let flows = net.input_flows();
        assert_eq!(flows[&s], None);
        assert_eq!(flows[&split], Some(12.0));
        assert_eq!(flows[&a], Some(6.0));
    }
}
