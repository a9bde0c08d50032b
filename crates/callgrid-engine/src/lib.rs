//! callgrid-engine: participant reconciliation engine.
//!
//! Maps the volatile roster of a call onto stable grid slots, computes the
//! delete/move/insert batch between consecutive grids, places the local
//! tile, and rate-limits passes under event storms.
//!
//! # Pass pipeline
//! ```text
//! DisplaySnapshot::read ─► diff::reconcile ─► local_slot::decide ─► PresentationSink
//!  (screen-share override)   (IdentityMap)      (side container)      (apply batch)
//! ```

pub mod diff;
pub mod display;
pub mod driver;
pub mod engine;
pub mod identity;
pub mod local_slot;
pub mod scheduler;
pub mod tile;

pub use display::DisplaySnapshot;
pub use driver::{DriverExit, ReconcileHandle};
pub use engine::{GridEngine, PassReport, Plan};
pub use identity::IdentityMap;
pub use local_slot::{LocalDecision, SideContainerChange};
pub use scheduler::{SchedulerState, SchedulerStats, UpdateScheduler};
pub use tile::{RenderContext, Tile, TileState};
