//! In-memory call session.
//!
//! Stands in for the calling SDK in tests and in the demo binary. Every
//! mutation updates the roster under one lock and then notifies observers,
//! so a pass triggered by the notification always sees the new state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use callgrid_core::{LocalMediaState, Participant, ParticipantId, StreamKind, VideoStream};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{CallSession, SessionEvent, SessionObservers};

#[derive(Debug, Default)]
struct Roster {
    order:        Vec<ParticipantId>,
    participants: HashMap<ParticipantId, Participant>,
    local_media:  LocalMediaState,
    local_name:   String,
}

#[derive(Debug, Default)]
pub struct SimulatedSession {
    roster:    Mutex<Roster>,
    observers: SessionObservers,
}

impl SimulatedSession {
    pub fn new(local_name: impl Into<String>) -> Self {
        let session = Self::default();
        session.roster().local_name = local_name.into();
        session
    }

    /// Adds (or replaces) a participant at the end of the roster.
    pub fn join(&self, participant: Participant) {
        {
            let mut roster = self.roster();
            if !roster.participants.contains_key(&participant.id) {
                roster.order.push(participant.id.clone());
            }
            info!("[Session] '{}' joined ({})", participant.display_name, participant.id);
            roster.participants.insert(participant.id.clone(), participant);
        }
        self.observers.notify(SessionEvent::RosterChanged);
    }

    /// Joins a participant with a freshly generated id and a camera stream.
    pub fn join_guest(&self, display_name: impl Into<String>) -> ParticipantId {
        let id = ParticipantId::new(Uuid::new_v4().to_string());
        let camera = VideoStream::camera(format!("cam-{id}"));
        self.join(Participant::new(id.clone(), display_name).with_stream(camera));
        id
    }

    pub fn leave(&self, id: &ParticipantId) {
        let removed = {
            let mut roster = self.roster();
            roster.order.retain(|p| p != id);
            roster.participants.remove(id)
        };
        if let Some(p) = removed {
            info!("[Session] '{}' left ({})", p.display_name, id);
            self.observers.notify(SessionEvent::RosterChanged);
        }
    }

    /// Lists `id` in the roster without any resolvable participant record.
    pub fn announce_unresolved(&self, id: impl Into<ParticipantId>) {
        let id = id.into();
        debug!("[Session] announcing unresolved id {}", id);
        self.roster().order.push(id);
        self.observers.notify(SessionEvent::RosterChanged);
    }

    pub fn set_muted(&self, id: &ParticipantId, muted: bool) {
        self.update(id, |p| p.is_muted = muted);
    }

    pub fn set_speaking(&self, id: &ParticipantId, speaking: bool) {
        self.update(id, |p| p.is_speaking = speaking);
    }

    pub fn set_camera(&self, id: &ParticipantId, on: bool) {
        self.update(id, |p| {
            p.video_streams.retain(|s| s.kind != StreamKind::Camera);
            if on {
                p.video_streams.insert(0, VideoStream::camera(format!("cam-{}", p.id)));
            }
        });
    }

    pub fn start_screen_share(&self, id: &ParticipantId) {
        self.update(id, |p| {
            if !p.is_screen_sharing() {
                p.video_streams.push(VideoStream::screen_sharing(format!("screen-{}", p.id)));
            }
        });
    }

    pub fn stop_screen_share(&self, id: &ParticipantId) {
        self.update(id, |p| p.video_streams.retain(|s| s.kind != StreamKind::ScreenSharing));
    }

    pub fn set_local_media(&self, media: LocalMediaState) {
        self.roster().local_media = media;
        self.observers.notify(SessionEvent::LocalMediaChanged);
    }

    pub fn background(&self) {
        self.observers.notify(SessionEvent::AppBackgrounded);
    }

    pub fn foreground(&self) {
        self.observers.notify(SessionEvent::AppForegrounded);
    }

    pub fn end_call(&self) {
        info!("[Session] call ended");
        self.observers.notify(SessionEvent::CallEnded);
    }

    fn update(&self, id: &ParticipantId, f: impl FnOnce(&mut Participant)) {
        let found = match self.roster().participants.get_mut(id) {
            Some(p) => {
                f(p);
                true
            }
            None => false,
        };
        if found {
            self.observers.notify(SessionEvent::ParticipantStateChanged);
        } else {
            debug!("[Session] update for unknown participant {} ignored", id);
        }
    }

    fn roster(&self) -> MutexGuard<'_, Roster> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CallSession for SimulatedSession {
    fn remote_participant_ids(&self) -> Vec<ParticipantId> {
        self.roster().order.clone()
    }

    fn participant(&self, id: &ParticipantId) -> Option<Participant> {
        self.roster().participants.get(id).cloned()
    }

    fn screen_sharer(&self) -> Option<ParticipantId> {
        let roster = self.roster();
        roster
            .order
            .iter()
            .find(|id| roster.participants.get(*id).is_some_and(Participant::is_screen_sharing))
            .cloned()
    }

    fn local_media(&self) -> LocalMediaState {
        self.roster().local_media
    }

    fn local_display_name(&self) -> String {
        self.roster().local_name.clone()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.observers.subscribe()
    }
}
