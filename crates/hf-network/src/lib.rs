//! hf-network: hydraulic network model and flow simulation for hydroflow.
//!
//! Provides:
//! - Element variants (source, tap, split, multisplit, sink) as a closed sum type
//! - An arena-backed `Network` container with stable element handles
//! - Pre-order flow simulation reported to a `SimulationObserver`
//! - Element deletion that splices upstream onto downstream
//! - A fluent `NetworkBuilder` with nested branch contexts
//!
//! # Example
//!
//! ```
//! use hf_network::{Network, RecordingObserver};
//!
//! let net = Network::builder()
//!     .add_source("Src").with_flow(20.0)
//!     .link_to_split("T")
//!     .with_outputs()
//!         .link_to_sink("A")
//!     .then()
//!         .link_to_sink("B")
//!     .done()
//!     .complete();
//!
//! let mut observer = RecordingObserver::new();
//! net.simulate(&mut observer);
//! assert_eq!(observer.flow_of("A").unwrap().input, Some(10.0));
//! ```

pub mod builder;
pub mod element;
pub mod error;
pub mod network;
pub mod observer;
mod rewire;
pub mod simulate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use element::{Element, ElementKind, Variant};
pub use error::{NetworkError, NetworkResult};
pub use network::Network;
pub use observer::{CallbackObserver, Level, Notification, RecordingObserver, SimulationObserver};
pub use simulate::SimulationOptions;
