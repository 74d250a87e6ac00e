//! Observer contract for simulation notifications.

use hf_core::Real;
use serde::{Deserialize, Serialize};

use crate::element::ElementKind;

/// Receives per-element results of a simulation pass.
///
/// `None` marks a flow that does not apply: the input of a source and the
/// outputs of a sink. A closed tap reports `Some(0.0)`, never `None`.
pub trait SimulationObserver {
    /// Called exactly once per reached element, in pre-order.
    fn notify_flow(
        &mut self,
        kind: ElementKind,
        name: &str,
        input: Option<Real>,
        outputs: Option<&[Real]>,
    );

    /// Called before `notify_flow` of an element whose input exceeds its
    /// threshold, only during checked simulation.
    fn notify_flow_error(&mut self, kind: ElementKind, name: &str, actual: Real, threshold: Real);
}

impl<O: SimulationObserver + ?Sized> SimulationObserver for &mut O {
    fn notify_flow(
        &mut self,
        kind: ElementKind,
        name: &str,
        input: Option<Real>,
        outputs: Option<&[Real]>,
    ) {
        (**self).notify_flow(kind, name, input, outputs);
    }

    fn notify_flow_error(&mut self, kind: ElementKind, name: &str, actual: Real, threshold: Real) {
        (**self).notify_flow_error(kind, name, actual, threshold);
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Info,
    Error,
}

/// Owned record of a single observer callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub kind: ElementKind,
    pub name: String,
    pub input: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Real>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Real>,
}

impl Notification {
    pub fn flow(
        kind: ElementKind,
        name: &str,
        input: Option<Real>,
        outputs: Option<&[Real]>,
    ) -> Self {
        Self {
            level: Level::Info,
            kind,
            name: name.to_string(),
            input,
            outputs: outputs.map(<[Real]>::to_vec),
            threshold: None,
        }
    }

    pub fn flow_error(kind: ElementKind, name: &str, actual: Real, threshold: Real) -> Self {
        Self {
            level: Level::Error,
            kind,
            name: name.to_string(),
            input: Some(actual),
            outputs: None,
            threshold: Some(threshold),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Collects every notification in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    notifications: Vec<Notification>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }

    /// The flow (info-level) notification for `name`, if one was received.
    pub fn flow_of(&self, name: &str) -> Option<&Notification> {
        self.notifications
            .iter()
            .find(|n| n.level == Level::Info && n.name == name)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notification> + '_ {
        self.notifications.iter().filter(|n| n.is_error())
    }

    /// Names of the info-level notifications, in order.
    pub fn visit_order(&self) -> Vec<&str> {
        self.notifications
            .iter()
            .filter(|n| n.level == Level::Info)
            .map(|n| n.name.as_str())
            .collect()
    }
}

impl SimulationObserver for RecordingObserver {
    fn notify_flow(
        &mut self,
        kind: ElementKind,
        name: &str,
        input: Option<Real>,
        outputs: Option<&[Real]>,
    ) {
        self.notifications
            .push(Notification::flow(kind, name, input, outputs));
    }

    fn notify_flow_error(&mut self, kind: ElementKind, name: &str, actual: Real, threshold: Real) {
        self.notifications
            .push(Notification::flow_error(kind, name, actual, threshold));
    }
}

/// Adapts a closure taking owned notifications into an observer.
pub struct CallbackObserver<F>(pub F);

impl<F: FnMut(Notification)> SimulationObserver for CallbackObserver<F> {
    fn notify_flow(
        &mut self,
        kind: ElementKind,
        name: &str,
        input: Option<Real>,
        outputs: Option<&[Real]>,
    ) {
        (self.0)(Notification::flow(kind, name, input, outputs));
    }

    fn notify_flow_error(&mut self, kind: ElementKind, name: &str, actual: Real, threshold: Real) {
        (self.0)(Notification::flow_error(kind, name, actual, threshold));
    }
}
