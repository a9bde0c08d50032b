//! Headless presentation backend that logs every call through `tracing`.
//!
//! Used by the demo binary and as the reference sink in tests: it keeps a
//! [`GridModel`] so an inconsistent batch surfaces as an error instead of a
//! silently broken grid.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use callgrid_core::{CameraSwitchMode, PresentationError, TileId, VideoStream};
use tracing::{debug, info, trace};

use crate::{GridBatch, GridModel, GridShape, PresentationSink, TileView, TileViewFactory};

// ── TracingSink ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TracingSink {
    model:           GridModel,
    side:            Option<TileId>,
    shape:           GridShape,
    /// Simulated transition time awaited by `apply_batch`.
    frame_delay:     Duration,
    batches_applied: u64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    pub fn tiles(&self) -> &[TileId] {
        self.model.tiles()
    }

    pub fn side_container(&self) -> Option<TileId> {
        self.side
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn batches_applied(&self) -> u64 {
        self.batches_applied
    }
}

#[async_trait]
impl PresentationSink for TracingSink {
    async fn apply_batch(&mut self, batch: GridBatch) -> Result<(), PresentationError> {
        self.model.apply(&batch)?;
        if !self.frame_delay.is_zero() {
            tokio::time::sleep(self.frame_delay).await;
        }
        self.batches_applied += 1;
        info!("[Grid] batch #{} applied: {}", self.batches_applied, batch);
        Ok(())
    }

    fn occupied_slots(&self) -> usize {
        self.model.len()
    }

    fn set_grid_shape(&mut self, shape: GridShape) {
        if shape != self.shape {
            debug!("[Grid] shape {} → {}", self.shape, shape);
            self.shape = shape;
        }
    }

    fn attach_side_container(&mut self, tile: TileId) {
        debug!("[Grid] side container ← {}", tile);
        self.side = Some(tile);
    }

    fn detach_side_container(&mut self) {
        if let Some(tile) = self.side.take() {
            debug!("[Grid] side container cleared (was {})", tile);
        }
    }
}

// ── TracingViewFactory ────────────────────────────────────────────────────────

/// Creates [`TracingTileView`]s and counts the ones not yet disposed.
#[derive(Debug, Clone, Default)]
pub struct TracingViewFactory {
    live: Arc<AtomicUsize>,
}

impl TracingViewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views created but not yet disposed.
    pub fn live_views(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

impl TileViewFactory for TracingViewFactory {
    fn create_view(&mut self, tile: TileId) -> Box<dyn TileView> {
        self.live.fetch_add(1, Ordering::Relaxed);
        debug!("[View {}] created", tile);
        Box::new(TracingTileView { tile, live: Arc::clone(&self.live), disposed: false })
    }
}

pub struct TracingTileView {
    tile:     TileId,
    live:     Arc<AtomicUsize>,
    disposed: bool,
}

impl TileView for TracingTileView {
    fn set_display_name(&mut self, name: &str) {
        trace!("[View {}] name = {:?}", self.tile, name);
    }

    fn set_muted(&mut self, muted: bool) {
        trace!("[View {}] muted = {}", self.tile, muted);
    }

    fn set_speaking(&mut self, speaking: bool) {
        trace!("[View {}] speaking = {}", self.tile, speaking);
    }

    fn set_video_stream(&mut self, stream: Option<&VideoStream>) {
        match stream {
            Some(s) => debug!("[View {}] video ← {} ({:?})", self.tile, s.id, s.kind),
            None => debug!("[View {}] video detached", self.tile),
        }
    }

    fn set_name_label_visible(&mut self, visible: bool) {
        trace!("[View {}] label visible = {}", self.tile, visible);
    }

    fn set_camera_switch_mode(&mut self, mode: CameraSwitchMode) {
        trace!("[View {}] camera switch = {:?}", self.tile, mode);
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.live.fetch_sub(1, Ordering::Relaxed);
            debug!("[View {}] disposed", self.tile);
        }
    }
}
