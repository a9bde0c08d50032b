//! Diff engine: previous identity map + new ordered display set → new map
//! and the slot operations that carry the grid from one to the other.
//!
//! # Operation contract
//! ```text
//! deletes : slot in the starting arrangement      (ascending)
//! moves   : (starting slot, ending slot)          (ending slot ascending)
//! inserts : slot in the ending arrangement        (ascending)
//! ```
//! Participants kept at the same slot produce no operation. Applied with
//! [`callgrid_renderer::GridModel`] semantics the batch always lands on the
//! new arrangement; the property tests in `tests/` hold the engine to that.

use std::collections::HashSet;

use callgrid_core::{Participant, ParticipantId};
use callgrid_renderer::GridBatch;
use tracing::trace;

use crate::identity::IdentityMap;
use crate::tile::{RenderContext, TileMaker, TileState};

/// Rebuilds the identity map for `participants` (slot `i` = index `i`).
///
/// Reused tiles are refreshed in place, new ids get fresh tiles, and tiles of
/// participants that left are disposed. The returned batch covers remote
/// slots only; its `arrangement` is the new remote arrangement.
pub fn reconcile(
    mut previous: IdentityMap,
    participants: &[Participant],
    tiles: &mut TileMaker,
    ctx: RenderContext,
) -> (IdentityMap, GridBatch) {
    let mut batch = GridBatch::default();
    let keep: HashSet<&ParticipantId> = participants.iter().map(|p| &p.id).collect();

    // Cleanup runs against the starting arrangement, before any slot moves.
    let departed: Vec<(usize, ParticipantId)> = previous
        .entries()
        .filter(|(_, id)| !keep.contains(id))
        .map(|(slot, id)| (slot, id.clone()))
        .collect();
    for (slot, id) in departed {
        if let Some(mut tile) = previous.take_tile(&id) {
            trace!("[Diff] {} left slot {} ({})", id, slot, tile.id());
            tile.dispose();
        }
        batch.deletes.push(slot);
    }

    let mut next = IdentityMap::with_capacity(participants.len());
    for participant in participants {
        if next.contains(&participant.id) {
            continue;
        }
        let from = previous.slot_of(&participant.id);
        let reused = previous.take_tile(&participant.id);
        let slot = next.len();

        let mut tile = match (from, reused) {
            (Some(from), Some(tile)) => {
                if from != slot {
                    batch.moves.push((from, slot));
                }
                tile
            }
            _ => {
                batch.inserts.push(slot);
                tiles.make()
            }
        };
        tile.refresh(TileState::remote(participant, ctx));
        next.push(participant.id.clone(), tile);
    }

    // Anything still owned by the previous map was never matched.
    for mut tile in previous.into_tiles() {
        tile.dispose();
    }

    batch.arrangement = next.arrangement().to_vec();
    (next, batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use callgrid_core::TileId;
    use callgrid_renderer::{GridModel, TracingViewFactory};

    fn roster(ids: &[&str]) -> Vec<Participant> {
        ids.iter().map(|id| Participant::new(*id, id.to_uppercase())).collect()
    }

    fn pass(
        map: IdentityMap,
        ids: &[&str],
        tiles: &mut TileMaker,
        grid: &mut GridModel,
    ) -> (IdentityMap, GridBatch) {
        let (map, batch) = reconcile(map, &roster(ids), tiles, RenderContext::default());
        grid.apply(&batch).expect("batch consistent with grid");
        map.check().expect("dense map");
        (map, batch)
    }

    #[test]
    fn first_pass_inserts_everyone() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let mut grid = GridModel::new();
        let (map, batch) = pass(IdentityMap::new(), &["a", "b", "c"], &mut tiles, &mut grid);

        assert_eq!(batch.inserts, vec![0, 1, 2]);
        assert!(batch.deletes.is_empty() && batch.moves.is_empty());
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn unchanged_set_yields_no_operations() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let mut grid = GridModel::new();
        let (map, _) = pass(IdentityMap::new(), &["a", "b"], &mut tiles, &mut grid);
        let (_, batch) = pass(map, &["a", "b"], &mut tiles, &mut grid);

        assert!(batch.is_empty());
        assert_eq!(tiles.created(), 2);
    }

    #[test]
    fn replacing_first_participant_moves_survivor() {
        // [A, B] -> [B, C]
        let views = TracingViewFactory::new();
        let mut tiles = TileMaker::new(Box::new(views.clone()));
        let mut grid = GridModel::new();
        let (map, _) = pass(IdentityMap::new(), &["a", "b"], &mut tiles, &mut grid);
        let b_tile = map.tile_for(&"b".into()).map(|t| t.id());

        let (map, batch) = pass(map, &["b", "c"], &mut tiles, &mut grid);
        assert_eq!(batch.deletes, vec![0]);
        assert_eq!(batch.moves, vec![(1, 0)]);
        assert_eq!(batch.inserts, vec![1]);
        assert_eq!(map.tile_for(&"b".into()).map(|t| t.id()), b_tile);
        assert!(!map.contains(&"a".into()));
        // A's view was disposed, C's created.
        assert_eq!(views.live_views(), 2);
    }

    #[test]
    fn reorder_emits_moves_only() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let mut grid = GridModel::new();
        let (map, _) = pass(IdentityMap::new(), &["a", "b", "c"], &mut tiles, &mut grid);
        let (map, batch) = pass(map, &["c", "b", "a"], &mut tiles, &mut grid);

        assert_eq!(batch.moves, vec![(2, 0), (0, 2)]);
        assert!(batch.deletes.is_empty() && batch.inserts.is_empty());
        assert_eq!(map.tile_at(0).map(|t| t.id()), Some(TileId(2)));
    }

    #[test]
    fn removing_everyone_deletes_every_slot() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let mut grid = GridModel::new();
        let (map, _) = pass(IdentityMap::new(), &["a", "b", "c"], &mut tiles, &mut grid);
        let (map, batch) = pass(map, &[], &mut tiles, &mut grid);

        assert_eq!(batch.deletes, vec![0, 1, 2]);
        assert!(map.is_empty());
        assert!(grid.is_empty());
    }

    #[test]
    fn duplicate_ids_are_displayed_once() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let mut grid = GridModel::new();
        let (map, batch) = pass(IdentityMap::new(), &["a", "a", "b"], &mut tiles, &mut grid);
        assert_eq!(batch.inserts, vec![0, 1]);
        assert_eq!(map.slot_of(&"b".into()), Some(1));
    }

    #[test]
    fn reused_tile_picks_up_new_state() {
        let mut tiles = TileMaker::new(Box::new(TracingViewFactory::new()));
        let (map, _) = reconcile(IdentityMap::new(), &roster(&["a"]), &mut tiles, RenderContext::default());

        let mut muted = Participant::new("a", "Ada");
        muted.is_muted = true;
        let (map, batch) = reconcile(map, &[muted], &mut tiles, RenderContext::default());

        assert!(batch.is_empty());
        let state = map.tile_for(&"a".into()).and_then(|t| t.state()).cloned();
        assert_eq!(state.map(|s| (s.display_name, s.muted)), Some(("Ada".to_owned(), true)));
    }
}
