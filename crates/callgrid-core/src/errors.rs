use thiserror::Error;

use crate::types::{ParticipantId, Slot};

#[derive(Error, Debug)]
pub enum CallGridError {
    #[error("Configuration invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("Presentation failed: {0}")]
    Presentation(#[from] PresentationError),

    #[error("Reconcile driver failed: {reason}")]
    Driver { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Failures reported by a presentation sink while applying a grid batch.
///
/// The engine keeps slots dense, so any of these reaching the driver is a
/// programming error rather than a recoverable condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    #[error("Slot {slot} out of range (len {len})")]
    InvalidSlot { slot: Slot, len: usize },

    #[error("Batch inconsistent with current arrangement: {reason}")]
    Inconsistent { reason: String },

    #[error("Presentation sink closed")]
    SinkClosed,
}

/// Broken lockstep between the participant, slot and tile indexes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Index size mismatch: slots={slots} ids={ids} index={index} tiles={tiles}")]
    SizeMismatch { slots: usize, ids: usize, index: usize, tiles: usize },

    #[error("{id} maps to slot {slot} outside [0, {len})")]
    SlotOutOfRange { id: ParticipantId, slot: Slot, len: usize },

    #[error("Slot {slot} belongs to {owner}, not {id}")]
    WrongOwner { slot: Slot, owner: ParticipantId, id: ParticipantId },

    #[error("Slot {slot} has no tile in the arena")]
    MissingTile { slot: Slot },
}
