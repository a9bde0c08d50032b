use serde::{Deserialize, Serialize};

/// Position of a tile in the flat, zero-based grid section.
pub type Slot = usize;

// MARK: - ParticipantId

/// Opaque, stable identifier of a remote participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// MARK: - TileId

/// Stable handle of a tile in the engine's arena.
///
/// Handles are never reused within one engine, so two equal handles always
/// denote the same tile instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}

// MARK: - VideoStream

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Camera,
    ScreenSharing,
}

/// Descriptor of one remote (or local) video stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoStream {
    pub id: String,
    pub kind: StreamKind,
}

impl VideoStream {
    pub fn camera(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: StreamKind::Camera }
    }

    pub fn screen_sharing(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: StreamKind::ScreenSharing }
    }

    /// Stream rendered on the local tile while the local camera is on.
    pub fn local_camera() -> Self {
        Self::camera("local-camera")
    }
}

// MARK: - Participant

/// Read-only snapshot of a remote participant, taken per reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(alias = "displayName")]
    pub display_name: String,
    #[serde(alias = "isMuted")]
    pub is_muted: bool,
    #[serde(alias = "isSpeaking")]
    pub is_speaking: bool,
    #[serde(default, alias = "videoStreams")]
    pub video_streams: Vec<VideoStream>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_muted: false,
            is_speaking: false,
            video_streams: Vec::new(),
        }
    }

    pub fn with_stream(mut self, stream: VideoStream) -> Self {
        self.video_streams.push(stream);
        self
    }

    pub fn is_screen_sharing(&self) -> bool {
        self.screen_share_stream().is_some()
    }

    pub fn screen_share_stream(&self) -> Option<&VideoStream> {
        self.video_streams
            .iter()
            .find(|s| s.kind == StreamKind::ScreenSharing)
    }

    pub fn camera_stream(&self) -> Option<&VideoStream> {
        self.video_streams.iter().find(|s| s.kind == StreamKind::Camera)
    }

    /// Stream to render for this participant.
    ///
    /// Under the screen-share override the shared screen wins; otherwise the
    /// first camera stream is shown.
    pub fn preferred_stream(&self, screen_share_mode: bool) -> Option<&VideoStream> {
        if screen_share_mode {
            self.screen_share_stream().or_else(|| self.camera_stream())
        } else {
            self.camera_stream()
        }
    }
}

// MARK: - LocalMediaState

/// Local user's mute / camera preference flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalMediaState {
    #[serde(alias = "isMuted")]
    pub is_muted: bool,
    #[serde(alias = "cameraEnabled")]
    pub camera_enabled: bool,
}

// MARK: - LocalPlacement

/// Where the local tile is currently shown. The two placements are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalPlacement {
    SideContainer,
    InGrid(Slot),
}

impl LocalPlacement {
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::SideContainer => None,
            Self::InGrid(slot) => Some(*slot),
        }
    }

    pub fn is_in_grid(&self) -> bool {
        matches!(self, Self::InGrid(_))
    }
}

impl std::fmt::Display for LocalPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SideContainer => write!(f, "side-container"),
            Self::InGrid(slot) => write!(f, "grid[{slot}]"),
        }
    }
}

// MARK: - CameraSwitchMode

/// Framing the local camera-switch control is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSwitchMode {
    OneOnOne,
    MultiParty,
}

// MARK: - Orientation

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}
