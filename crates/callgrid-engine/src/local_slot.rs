//! Placement of the local participant's own tile.
//!
//! | remotes shown | placement          | label  | camera switch |
//! |---------------|--------------------|--------|---------------|
//! | exactly 1     | side container     | hidden | one-on-one    |
//! | 0 or ≥ 2      | last grid slot (N) | shown  | multi-party   |

use callgrid_core::{CameraSwitchMode, LocalPlacement, Slot, TileId};
use callgrid_renderer::GridBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideContainerChange {
    Unchanged,
    Attach,
    Detach,
}

/// Outcome of the local-slot policy for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDecision {
    pub placement:     LocalPlacement,
    pub delete:        Option<Slot>,
    pub insert:        Option<Slot>,
    pub relocate:      Option<(Slot, Slot)>,
    pub side:          SideContainerChange,
    pub label_visible: bool,
    pub camera_mode:   CameraSwitchMode,
}

impl LocalDecision {
    pub fn op_count(&self) -> usize {
        usize::from(self.delete.is_some())
            + usize::from(self.insert.is_some())
            + usize::from(self.relocate.is_some())
    }

    /// Adds the local tile's operations to a remote batch and appends it to
    /// the ending arrangement when it stays in the grid.
    pub fn extend_batch(&self, batch: &mut GridBatch, local: TileId) {
        batch.deletes.extend(self.delete);
        batch.moves.extend(self.relocate);
        batch.inserts.extend(self.insert);
        if self.placement.is_in_grid() {
            batch.arrangement.push(local);
        }
    }
}

/// Decides where the local tile goes given `remote_count` displayed remotes.
pub fn decide(previous: LocalPlacement, remote_count: usize, hide_label_one_on_one: bool) -> LocalDecision {
    let one_on_one = remote_count == 1;
    let mut decision = LocalDecision {
        placement:     previous,
        delete:        None,
        insert:        None,
        relocate:      None,
        side:          SideContainerChange::Unchanged,
        label_visible: !(one_on_one && hide_label_one_on_one),
        camera_mode:   if one_on_one { CameraSwitchMode::OneOnOne } else { CameraSwitchMode::MultiParty },
    };

    match (previous, one_on_one) {
        (LocalPlacement::InGrid(old), true) => {
            decision.placement = LocalPlacement::SideContainer;
            decision.delete = Some(old);
            decision.side = SideContainerChange::Attach;
        }
        (LocalPlacement::SideContainer, true) => {}
        (LocalPlacement::SideContainer, false) => {
            decision.placement = LocalPlacement::InGrid(remote_count);
            decision.insert = Some(remote_count);
            decision.side = SideContainerChange::Detach;
        }
        (LocalPlacement::InGrid(old), false) => {
            decision.placement = LocalPlacement::InGrid(remote_count);
            if old != remote_count {
                decision.relocate = Some((old, remote_count));
            }
        }
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_remote_moves_local_to_side_container() {
        let d = decide(LocalPlacement::InGrid(2), 1, true);
        assert_eq!(d.placement, LocalPlacement::SideContainer);
        assert_eq!(d.delete, Some(2));
        assert_eq!(d.side, SideContainerChange::Attach);
        assert!(!d.label_visible);
        assert_eq!(d.camera_mode, CameraSwitchMode::OneOnOne);
    }

    #[test]
    fn second_remote_brings_local_back_into_grid() {
        let d = decide(LocalPlacement::SideContainer, 2, true);
        assert_eq!(d.placement, LocalPlacement::InGrid(2));
        assert_eq!(d.insert, Some(2));
        assert_eq!(d.side, SideContainerChange::Detach);
        assert!(d.label_visible);
        assert_eq!(d.camera_mode, CameraSwitchMode::MultiParty);
    }

    #[test]
    fn alone_in_call_local_takes_slot_zero() {
        let d = decide(LocalPlacement::SideContainer, 0, true);
        assert_eq!(d.placement, LocalPlacement::InGrid(0));
        assert_eq!(d.insert, Some(0));
    }

    #[test]
    fn growing_grid_relocates_local_to_last_slot() {
        let d = decide(LocalPlacement::InGrid(2), 4, true);
        assert_eq!(d.relocate, Some((2, 4)));
        assert_eq!(d.side, SideContainerChange::Unchanged);
    }

    #[test]
    fn policy_is_idempotent() {
        for (placement, remotes) in [
            (LocalPlacement::SideContainer, 1),
            (LocalPlacement::InGrid(0), 0),
            (LocalPlacement::InGrid(3), 3),
        ] {
            let d = decide(placement, remotes, true);
            assert_eq!(d.op_count(), 0, "{placement} with {remotes} remotes");
            assert_eq!(d.side, SideContainerChange::Unchanged);
            assert_eq!(d.placement, placement);
        }
    }

    #[test]
    fn label_stays_visible_when_hiding_is_disabled() {
        assert!(decide(LocalPlacement::SideContainer, 1, false).label_visible);
    }

    #[test]
    fn extend_batch_appends_local_tile() {
        let mut batch = GridBatch { arrangement: vec![TileId(1), TileId(2)], ..Default::default() };
        decide(LocalPlacement::SideContainer, 2, true).extend_batch(&mut batch, TileId(0));
        assert_eq!(batch.inserts, vec![2]);
        assert_eq!(batch.arrangement, vec![TileId(1), TileId(2), TileId(0)]);
    }
}
