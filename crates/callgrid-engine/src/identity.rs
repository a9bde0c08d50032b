//! Bidirectional participant ↔ slot index.
//!
//! Tiles live in an arena keyed by [`TileId`]; two plain maps tie a
//! participant id to its slot and a slot to its tile. The map is rebuilt
//! from scratch by every reconciliation pass, which keeps the dense-slot
//! invariant checkable in one place ([`IdentityMap::check`]).

use std::collections::HashMap;

use callgrid_core::{IdentityError, ParticipantId, Slot, TileId};

use crate::tile::Tile;

#[derive(Debug, Default)]
pub struct IdentityMap {
    tiles:        HashMap<TileId, Tile>,
    id_to_slot:   HashMap<ParticipantId, Slot>,
    slot_to_tile: Vec<TileId>,
    /// Reverse of `slot_to_tile`, needed when a slot is vacated.
    slot_to_id:   Vec<ParticipantId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tiles:        HashMap::with_capacity(capacity),
            id_to_slot:   HashMap::with_capacity(capacity),
            slot_to_tile: Vec::with_capacity(capacity),
            slot_to_id:   Vec::with_capacity(capacity),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slot_to_tile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_to_tile.is_empty()
    }

    pub fn slot_of(&self, id: &ParticipantId) -> Option<Slot> {
        self.id_to_slot.get(id).copied()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.id_to_slot.contains_key(id)
    }

    pub fn tile_at(&self, slot: Slot) -> Option<&Tile> {
        self.slot_to_tile.get(slot).and_then(|id| self.tiles.get(id))
    }

    pub fn tile_for(&self, id: &ParticipantId) -> Option<&Tile> {
        self.slot_of(id).and_then(|slot| self.tile_at(slot))
    }

    pub fn participant_at(&self, slot: Slot) -> Option<&ParticipantId> {
        self.slot_to_id.get(slot)
    }

    /// Tile handles in slot order.
    pub fn arrangement(&self) -> &[TileId] {
        &self.slot_to_tile
    }

    /// Appends `tile` for `id` at the next free slot.
    pub(crate) fn push(&mut self, id: ParticipantId, tile: Tile) -> Slot {
        let slot = self.slot_to_tile.len();
        self.slot_to_tile.push(tile.id());
        self.slot_to_id.push(id.clone());
        self.id_to_slot.insert(id, slot);
        self.tiles.insert(tile.id(), tile);
        slot
    }

    /// Removes and returns the tile bound to `id`, leaving its slot dangling.
    ///
    /// Only used while the previous map is being consumed by a rebuild.
    pub(crate) fn take_tile(&mut self, id: &ParticipantId) -> Option<Tile> {
        let slot = self.id_to_slot.remove(id)?;
        let tile_id = *self.slot_to_tile.get(slot)?;
        self.tiles.remove(&tile_id)
    }

    /// Entries as `(slot, id)` in ascending slot order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (Slot, &ParticipantId)> {
        self.slot_to_id.iter().enumerate()
    }

    /// Consumes the map, yielding every tile it still owns.
    pub(crate) fn into_tiles(self) -> impl Iterator<Item = Tile> {
        self.tiles.into_values()
    }

    /// Verifies the lockstep and density invariants.
    pub fn check(&self) -> Result<(), IdentityError> {
        let n = self.slot_to_tile.len();
        if self.slot_to_id.len() != n || self.id_to_slot.len() != n || self.tiles.len() != n {
            return Err(IdentityError::SizeMismatch {
                slots: n,
                ids:   self.slot_to_id.len(),
                index: self.id_to_slot.len(),
                tiles: self.tiles.len(),
            });
        }
        for (id, &slot) in &self.id_to_slot {
            if slot >= n {
                return Err(IdentityError::SlotOutOfRange { id: id.clone(), slot, len: n });
            }
            let owner = &self.slot_to_id[slot];
            if owner != id {
                return Err(IdentityError::WrongOwner { slot, owner: owner.clone(), id: id.clone() });
            }
            if !self.tiles.contains_key(&self.slot_to_tile[slot]) {
                return Err(IdentityError::MissingTile { slot });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileMaker;
    use callgrid_renderer::TracingViewFactory;

    fn maker() -> TileMaker {
        TileMaker::new(Box::new(TracingViewFactory::new()))
    }

    #[test]
    fn push_keeps_maps_in_lockstep() {
        let mut tiles = maker();
        let mut map = IdentityMap::new();
        assert_eq!(map.push("a".into(), tiles.make()), 0);
        assert_eq!(map.push("b".into(), tiles.make()), 1);

        assert_eq!(map.slot_of(&"b".into()), Some(1));
        assert_eq!(map.participant_at(0), Some(&ParticipantId::new("a")));
        assert_eq!(map.tile_for(&"a".into()).map(Tile::id), Some(TileId(0)));
        assert_eq!(map.arrangement(), &[TileId(0), TileId(1)]);
        map.check().expect("consistent map");
    }

    #[test]
    fn take_tile_detaches_from_arena() {
        let mut tiles = maker();
        let mut map = IdentityMap::new();
        map.push("a".into(), tiles.make());

        let tile = map.take_tile(&"a".into()).expect("tile present");
        assert_eq!(tile.id(), TileId(0));
        assert!(map.take_tile(&"a".into()).is_none());
        assert_eq!(
            map.check(),
            Err(IdentityError::SizeMismatch { slots: 1, ids: 1, index: 0, tiles: 0 })
        );
    }
}
