//! Selection of the participants to display in one pass.

use std::collections::HashSet;

use callgrid_core::{LocalMediaState, Participant};
use callgrid_session::CallSession;
use tracing::debug;

/// Live state read from the session at the start of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplaySnapshot {
    /// Ordered display set; `participants[i]` goes to slot `i`.
    pub participants: Vec<Participant>,
    /// True when the set was collapsed to the screen-sharing participant.
    pub screen_share: bool,
    pub local_media:  LocalMediaState,
    pub local_name:   String,
}

impl DisplaySnapshot {
    /// Reads the session, applying the screen-share override.
    ///
    /// Roster enumeration stops at the first id that no longer resolves to a
    /// participant; that id and everything after it are left out of the pass.
    pub fn read(session: &dyn CallSession) -> Self {
        let local_media = session.local_media();
        let local_name = session.local_display_name();

        if let Some(sharer) = session.screen_sharer() {
            match session.participant(&sharer) {
                Some(p) => {
                    return Self { participants: vec![p], screen_share: true, local_media, local_name };
                }
                None => debug!("[Display] screen sharer {} not resolvable, showing roster", sharer),
            }
        }

        let ids = session.remote_participant_ids();
        let mut seen = HashSet::with_capacity(ids.len());
        let mut participants = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let Some(participant) = session.participant(id) else {
                debug!(
                    "[Display] {} unresolved, dropping {} trailing id(s)",
                    id,
                    ids.len() - index
                );
                break;
            };
            if seen.insert(id.clone()) {
                participants.push(participant);
            }
        }

        Self { participants, screen_share: false, local_media, local_name }
    }
}
