//! Fluent network builder with nested branches.
//!
//! ```
//! use hf_network::Network;
//!
//! let net = Network::builder()
//!     .add_source("Src").with_flow(20.0)
//!     .link_to_tap("Tap").open()
//!     .link_to_split("T")
//!     .with_outputs()
//!         .link_to_sink("A")
//!     .then()
//!         .link_to_sink("B")
//!     .done()
//!     .complete();
//!
//! assert_eq!(net.len(), 5);
//! ```

use hf_core::{ElementId, Real};
use tracing::trace;

use crate::element::Element;
use crate::network::Network;

/// An open split/multisplit and the output the next branch attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BranchContext {
    split: ElementId,
    next_output: usize,
}

/// Builds a `Network` from a flat sequence of calls.
///
/// The cursor is the element new links attach to. `branches` holds the open
/// branch points, innermost last. Parameter setters apply to the cursor and
/// are ignored when its variant does not have that parameter.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: Network,
    cursor: Option<ElementId>,
    branches: Vec<BranchContext>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new network rooted at a source named `name`.
    ///
    /// Discards anything built so far.
    pub fn add_source(mut self, name: impl Into<String>) -> Self {
        self.network = Network::new();
        self.branches.clear();
        let id = self.network.push(Element::source(name));
        self.cursor = Some(id);
        self
    }

    pub fn link_to_tap(mut self, name: impl Into<String>) -> Self {
        self.link(Element::tap(name));
        self
    }

    pub fn link_to_sink(mut self, name: impl Into<String>) -> Self {
        self.link(Element::sink(name));
        self
    }

    /// Link a split and open a branch context on it.
    pub fn link_to_split(mut self, name: impl Into<String>) -> Self {
        let id = self.link(Element::split(name));
        self.open_branch(id);
        self
    }

    /// Link a multisplit with `num_outputs` outputs and open a branch context on it.
    pub fn link_to_multisplit(mut self, name: impl Into<String>, num_outputs: usize) -> Self {
        let id = self.link(Element::multisplit(name, num_outputs));
        self.open_branch(id);
        self
    }

    /// Next link attaches to output 0 of the innermost open split.
    pub fn with_outputs(mut self) -> Self {
        if let Some(ctx) = self.branches.last_mut() {
            ctx.next_output = 0;
            self.cursor = Some(ctx.split);
        }
        self
    }

    /// Next link attaches to the following output of the innermost open split.
    pub fn then(mut self) -> Self {
        if let Some(ctx) = self.branches.last_mut() {
            ctx.next_output += 1;
            self.cursor = Some(ctx.split);
            trace!(output = ctx.next_output, "next branch");
        }
        self
    }

    /// Close the innermost branch context.
    pub fn done(mut self) -> Self {
        if self.branches.pop().is_some() {
            if let Some(ctx) = self.branches.last() {
                self.cursor = Some(ctx.split);
            }
        }
        self
    }

    pub fn with_flow(mut self, flow: Real) -> Self {
        if let Some(element) = self.cursor_mut() {
            element.set_flow(flow);
        }
        self
    }

    pub fn open(mut self) -> Self {
        if let Some(element) = self.cursor_mut() {
            element.set_open(true);
        }
        self
    }

    pub fn closed(mut self) -> Self {
        if let Some(element) = self.cursor_mut() {
            element.set_open(false);
        }
        self
    }

    /// Proportions of the multisplit at the cursor; ignored on length mismatch.
    pub fn with_proportions(mut self, proportions: &[Real]) -> Self {
        if let Some(element) = self.cursor_mut() {
            if !element.set_proportions(proportions) {
                trace!(element = element.name(), "proportions ignored");
            }
        }
        self
    }

    pub fn max_flow(mut self, threshold: Real) -> Self {
        if let Some(element) = self.cursor_mut() {
            element.set_max_flow(threshold);
        }
        self
    }

    /// Return the assembled network.
    pub fn complete(self) -> Network {
        self.network
    }

    fn cursor_mut(&mut self) -> Option<&mut Element> {
        self.network.get_mut(self.cursor?)
    }

    fn open_branch(&mut self, split: ElementId) {
        self.branches.push(BranchContext {
            split,
            next_output: 0,
        });
    }

    /// Add `element`, attach it after the cursor, and move the cursor to it.
    fn link(&mut self, element: Element) -> ElementId {
        let id = self.network.push(element);
        if let Some(cursor) = self.cursor {
            let branch = self.branches.last().copied();
            if let Some(upstream) = self.network.get_mut(cursor) {
                match branch {
                    Some(ctx) if ctx.split == cursor => {
                        if !upstream.connect_at(id, ctx.next_output) {
                            trace!(
                                split = upstream.name(),
                                output = ctx.next_output,
                                "branch output out of range, left unattached"
                            );
                        }
                    }
                    _ => upstream.connect(id),
                }
            }
        }
        self.cursor = Some(id);
        id
    }
}
