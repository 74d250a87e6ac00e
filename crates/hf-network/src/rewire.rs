//! Element deletion with topology splicing.

use tracing::debug;

use crate::element::Element;
use crate::error::{NetworkError, NetworkResult};
use crate::network::Network;

impl Network {
    /// Delete the first element named `name`, splicing its upstream element
    /// directly onto its downstream element.
    ///
    /// - A leaf (no downstream) leaves the upstream slot empty.
    /// - A split or multisplit with more than one connected output is refused.
    /// - Without an upstream element nothing is rewired; whatever was
    ///   downstream is no longer reachable from the source.
    ///
    /// On error the network is unchanged. On success the removed element is
    /// returned.
    pub fn delete_element(&mut self, name: &str) -> NetworkResult<Element> {
        let id = self.find(name).ok_or_else(|| NetworkError::NotFound {
            name: name.to_string(),
        })?;
        let element = self.get(id).ok_or(NetworkError::UnknownId { id })?;

        let connected = element.connected_outputs();
        if element.is_branching() && connected > 1 {
            debug!(element = name, connected, "refusing to delete branching element");
            return Err(NetworkError::AmbiguousBranches {
                name: name.to_string(),
                connected,
            });
        }

        let downstream = element.first_connected();
        match self.upstream_of(id) {
            Some((upstream, slot)) => {
                if let Some(up) = self.get_mut(upstream) {
                    up.set_slot(slot, downstream);
                    debug!(
                        element = name,
                        upstream = up.name(),
                        slot,
                        ?downstream,
                        "spliced around deleted element"
                    );
                }
            }
            None => {
                debug!(element = name, ?downstream, "deleted element has no upstream");
            }
        }

        self.remove(id)
    }
}
