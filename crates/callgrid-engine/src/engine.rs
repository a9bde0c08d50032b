use callgrid_core::{GridConfig, LocalPlacement, ParticipantId, PresentationError, TileId};
use callgrid_renderer::{GridBatch, GridShape, PresentationSink, TileViewFactory};
use callgrid_session::CallSession;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::diff;
use crate::display::DisplaySnapshot;
use crate::identity::IdentityMap;
use crate::local_slot::{self, LocalDecision, SideContainerChange};
use crate::tile::{RenderContext, Tile, TileMaker, TileState};

// ── PassReport ────────────────────────────────────────────────────────────────

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub pass:         u64,
    pub started_at:   Instant,
    pub deletes:      usize,
    pub moves:        usize,
    pub inserts:      usize,
    pub remote_count: usize,
    pub screen_share: bool,
    pub placement:    LocalPlacement,
    pub shape:        GridShape,
}

impl PassReport {
    pub fn op_count(&self) -> usize {
        self.deletes + self.moves + self.inserts
    }
}

/// Grid changes computed for one pass, not yet handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub batch:        GridBatch,
    pub local:        LocalDecision,
    pub remote_count: usize,
    pub screen_share: bool,
}

// ── GridEngine ────────────────────────────────────────────────────────────────

/// Owns every tile and turns session snapshots into grid batches.
pub struct GridEngine {
    config:          GridConfig,
    tiles:           TileMaker,
    map:             IdentityMap,
    local:           Tile,
    placement:       LocalPlacement,
    video_suspended: bool,
    passes:          u64,
    torn_down:       bool,
}

impl GridEngine {
    /// Creates the engine and its local tile. The local tile starts in the
    /// side container; call [`GridEngine::attach`] before the first pass.
    pub fn new(config: GridConfig, views: Box<dyn TileViewFactory>) -> Self {
        let mut tiles = TileMaker::new(views);
        let local = tiles.make();
        Self {
            config,
            tiles,
            map: IdentityMap::new(),
            local,
            placement: LocalPlacement::SideContainer,
            video_suspended: false,
            passes: 0,
            torn_down: false,
        }
    }

    /// Shows the local tile in the side container of a fresh call view.
    pub fn attach(&mut self, sink: &mut dyn PresentationSink) {
        if self.placement == LocalPlacement::SideContainer {
            sink.attach_side_container(self.local.id());
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn placement(&self) -> LocalPlacement {
        self.placement
    }

    pub fn local_tile(&self) -> &Tile {
        &self.local
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.map
    }

    pub fn tile_for(&self, id: &ParticipantId) -> Option<&Tile> {
        self.map.tile_for(id)
    }

    /// Full arrangement (remote tiles, then the local tile when in the grid).
    pub fn arrangement(&self) -> Vec<TileId> {
        let mut tiles = self.map.arrangement().to_vec();
        if self.placement.is_in_grid() {
            tiles.push(self.local.id());
        }
        tiles
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn tiles_created(&self) -> u64 {
        self.tiles.created()
    }

    pub fn video_suspended(&self) -> bool {
        self.video_suspended
    }

    /// Takes effect on the next pass.
    pub fn set_video_suspended(&mut self, suspended: bool) {
        self.video_suspended = suspended;
    }

    /// Runs the diff and the local-slot policy for `snapshot`.
    ///
    /// Tiles are refreshed immediately; the returned plan still has to be
    /// presented with [`GridEngine::present`].
    pub fn plan(&mut self, snapshot: &DisplaySnapshot) -> Plan {
        let ctx = RenderContext {
            screen_share:    snapshot.screen_share,
            video_suspended: self.video_suspended,
        };

        let previous = std::mem::take(&mut self.map);
        let (map, mut batch) = diff::reconcile(previous, &snapshot.participants, &mut self.tiles, ctx);
        self.map = map;
        let remote_count = self.map.len();

        let local = local_slot::decide(self.placement, remote_count, self.config.hide_local_label_one_on_one);
        local.extend_batch(&mut batch, self.local.id());
        self.placement = local.placement;
        self.local.refresh(TileState::local(
            &snapshot.local_name,
            snapshot.local_media,
            local.label_visible,
            local.camera_mode,
            ctx,
        ));

        Plan { batch, local, remote_count, screen_share: snapshot.screen_share }
    }

    /// Hands a plan to the sink. The side container is emptied before the
    /// batch and filled after it, so the local tile is never shown twice.
    pub async fn present(
        &mut self,
        plan: Plan,
        sink: &mut dyn PresentationSink,
    ) -> Result<GridShape, PresentationError> {
        if plan.local.side == SideContainerChange::Detach {
            sink.detach_side_container();
        }
        if !plan.batch.is_empty() {
            sink.apply_batch(plan.batch).await?;
        }
        if plan.local.side == SideContainerChange::Attach {
            sink.attach_side_container(self.local.id());
        }

        let shape = GridShape::for_count(sink.occupied_slots(), self.config.orientation);
        sink.set_grid_shape(shape);
        Ok(shape)
    }

    /// One full reconciliation pass against the live session.
    pub async fn run_pass(
        &mut self,
        session: &dyn CallSession,
        sink: &mut dyn PresentationSink,
    ) -> Result<PassReport, PresentationError> {
        let started_at = Instant::now();
        let snapshot = DisplaySnapshot::read(session);
        let plan = self.plan(&snapshot);
        let mut report = PassReport {
            pass: self.passes + 1,
            started_at,
            deletes: plan.batch.deletes.len(),
            moves: plan.batch.moves.len(),
            inserts: plan.batch.inserts.len(),
            remote_count: plan.remote_count,
            screen_share: plan.screen_share,
            placement: self.placement,
            shape: GridShape::EMPTY,
        };
        report.shape = self.present(plan, sink).await?;
        self.passes = report.pass;

        debug!(
            "[Engine] pass #{}: -{} ~{} +{} remotes={} local={} shape={}{}",
            report.pass,
            report.deletes,
            report.moves,
            report.inserts,
            report.remote_count,
            report.placement,
            report.shape,
            if report.screen_share { " (screen share)" } else { "" }
        );
        Ok(report)
    }

    /// Disposes every tile, the local one included, and clears the side
    /// container. The engine must not be used afterwards.
    pub fn teardown(&mut self, sink: &mut dyn PresentationSink) {
        if self.torn_down {
            return;
        }
        if self.placement == LocalPlacement::SideContainer {
            sink.detach_side_container();
        }
        let disposed = self.dispose_all();
        debug!("[Engine] teardown after {} pass(es), {} tile(s) disposed", self.passes, disposed);
    }

    fn dispose_all(&mut self) -> usize {
        let mut count = 0;
        for mut tile in std::mem::take(&mut self.map).into_tiles() {
            tile.dispose();
            count += 1;
        }
        self.local.dispose();
        self.torn_down = true;
        count + 1
    }
}

impl Drop for GridEngine {
    fn drop(&mut self) {
        if !self.torn_down {
            warn!("[Engine] dropped without teardown, disposing tiles");
            self.dispose_all();
        }
    }
}
