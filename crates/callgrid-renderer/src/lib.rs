//! callgrid-renderer: presentation contract for the participant grid.
//!
//! The engine never draws anything itself. It hands a [`GridBatch`] to a
//! [`PresentationSink`] and pushes per-participant state into [`TileView`]
//! adapters created by a [`TileViewFactory`].
//!
//! # Batch semantics
//! ```text
//! deletes : slots of the starting arrangement
//! moves   : (starting slot, ending slot)
//! inserts : slots of the ending arrangement
//! ```
//! Tiles that are neither deleted nor moved keep their relative order and
//! fill the remaining ending slots. [`GridModel`] implements exactly this.

use async_trait::async_trait;
use callgrid_core::{CameraSwitchMode, PresentationError, TileId, VideoStream};

pub mod batch;
pub mod layout;
pub mod tracing_sink;

pub use batch::{GridBatch, GridModel};
pub use layout::{Extent, GridShape};
pub use tracing_sink::{TracingSink, TracingViewFactory};

// MARK: - PresentationSink

/// Surface that displays the grid and the local side container.
#[async_trait]
pub trait PresentationSink: Send {
    /// Applies one batch as a single atomic, non-animated transition.
    ///
    /// Returns once the transition has completed.
    async fn apply_batch(&mut self, batch: GridBatch) -> Result<(), PresentationError>;

    /// Number of tiles currently occupying grid slots.
    fn occupied_slots(&self) -> usize;

    /// Resizes the grid cells for the current occupancy.
    fn set_grid_shape(&mut self, shape: GridShape);

    /// Shows `tile` in the dedicated side container.
    fn attach_side_container(&mut self, tile: TileId);

    /// Empties the side container.
    fn detach_side_container(&mut self);
}

// MARK: - TileView

/// Per-tile view adapter. Owned by the engine's tile, never by the sink.
pub trait TileView: Send {
    fn set_display_name(&mut self, name: &str);
    fn set_muted(&mut self, muted: bool);
    fn set_speaking(&mut self, speaking: bool);
    fn set_video_stream(&mut self, stream: Option<&VideoStream>);
    fn set_name_label_visible(&mut self, visible: bool);
    fn set_camera_switch_mode(&mut self, mode: CameraSwitchMode);

    /// Releases any attached media resources. Called exactly once.
    fn dispose(&mut self);
}

pub trait TileViewFactory: Send {
    fn create_view(&mut self, tile: TileId) -> Box<dyn TileView>;
}
