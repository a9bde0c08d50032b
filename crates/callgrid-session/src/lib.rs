use std::sync::{Mutex, PoisonError};

use callgrid_core::{LocalMediaState, Participant, ParticipantId};
use tokio::sync::mpsc;
use tracing::trace;

pub mod simulated;

pub use simulated::SimulatedSession;

// MARK: - CallSession trait

/// Read side of the calling SDK as seen by the grid engine.
///
/// Every query returns the live state at call time; the engine never keeps
/// deltas between passes.
pub trait CallSession: Send + Sync {
    /// Ordered ids of the connected remote participants.
    fn remote_participant_ids(&self) -> Vec<ParticipantId>;

    /// Current state of one participant, `None` if it can no longer be resolved.
    fn participant(&self, id: &ParticipantId) -> Option<Participant>;

    /// The participant whose screen share is displayable, if any.
    fn screen_sharer(&self) -> Option<ParticipantId>;

    fn local_media(&self) -> LocalMediaState;

    fn local_display_name(&self) -> String;

    /// Registers a new observer of change notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent>;
}

// MARK: - SessionEvent

/// Payload-free change notification. Receivers re-read the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    RosterChanged,
    ParticipantStateChanged,
    LocalMediaChanged,
    AppBackgrounded,
    AppForegrounded,
    CallEnded,
}

// MARK: - SessionObservers

/// Explicit observer list owned by a session implementation.
#[derive(Debug, Default)]
pub struct SessionObservers {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>,
}

impl SessionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        rx
    }

    /// Delivers `event` to every live observer, dropping closed ones.
    pub fn notify(&self, event: SessionEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(event).is_ok());
        trace!("[Session] {:?} → {} observer(s)", event, subscribers.len());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<SessionEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
