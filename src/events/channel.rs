//! Progress channel backed by crossbeam-channel.

use super::{Event, PipelineEvent, PipelinePhase};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Sending half, handed to the pipeline and shared with its rayon workers
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event; dropped silently once the receiver is gone
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    pub fn phase_changed(&self, phase: PipelinePhase) {
        self.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }
}

/// Receiving half, read by the presentation layer
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until an event arrives; `None` once every sender is dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Events until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Creates connected sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded, so a slow renderer never stalls classification
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose events go nowhere, for runs without progress output
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
