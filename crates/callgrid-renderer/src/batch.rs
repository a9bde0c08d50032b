use callgrid_core::{PresentationError, Slot, TileId};

// MARK: - GridBatch

/// One atomic grid transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridBatch {
    pub deletes: Vec<Slot>,
    pub moves: Vec<(Slot, Slot)>,
    pub inserts: Vec<Slot>,
    /// Tiles occupying slots `[0, len)` once the batch is applied.
    pub arrangement: Vec<TileId>,
}

impl GridBatch {
    /// True when the batch carries no operation at all.
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.moves.is_empty() && self.inserts.is_empty()
    }

    pub fn op_count(&self) -> usize {
        self.deletes.len() + self.moves.len() + self.inserts.len()
    }
}

impl std::fmt::Display for GridBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "deletes={:?} moves={:?} inserts={:?} len={}",
            self.deletes,
            self.moves,
            self.inserts,
            self.arrangement.len()
        )
    }
}

// MARK: - GridModel

/// Indexed tile collection that applies batches with sink semantics.
///
/// Besides backing in-memory sinks it verifies that a batch, applied to the
/// current arrangement, produces exactly `batch.arrangement`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridModel {
    tiles: Vec<TileId>,
}

impl GridModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn apply(&mut self, batch: &GridBatch) -> Result<(), PresentationError> {
        let old_len = self.tiles.len();
        let new_len = (old_len + batch.inserts.len())
            .checked_sub(batch.deletes.len())
            .ok_or_else(|| inconsistent(format!(
                "{} deletes against {} tiles",
                batch.deletes.len(),
                old_len
            )))?;
        if batch.arrangement.len() != new_len {
            return Err(inconsistent(format!(
                "arrangement has {} tiles, batch yields {}",
                batch.arrangement.len(),
                new_len
            )));
        }

        // Starting slots left by deletes and move sources.
        let mut vacated = vec![false; old_len];
        let sources = batch.deletes.iter().chain(batch.moves.iter().map(|(from, _)| from));
        for &slot in sources {
            if slot >= old_len {
                return Err(PresentationError::InvalidSlot { slot, len: old_len });
            }
            if vacated[slot] {
                return Err(inconsistent(format!("starting slot {slot} vacated twice")));
            }
            vacated[slot] = true;
        }

        let mut next: Vec<Option<TileId>> = vec![None; new_len];
        for &(from, to) in &batch.moves {
            claim(&mut next, to, self.tiles[from])?;
        }
        for &slot in &batch.inserts {
            let tile = batch
                .arrangement
                .get(slot)
                .copied()
                .ok_or(PresentationError::InvalidSlot { slot, len: new_len })?;
            claim(&mut next, slot, tile)?;
        }

        let mut survivors = self
            .tiles
            .iter()
            .zip(vacated.iter())
            .filter(|(_, gone)| !**gone)
            .map(|(tile, _)| *tile);
        for cell in next.iter_mut().filter(|cell| cell.is_none()) {
            *cell = Some(
                survivors
                    .next()
                    .ok_or_else(|| inconsistent("ending slot left empty".into()))?,
            );
        }
        if survivors.next().is_some() {
            return Err(inconsistent("surviving tile has no ending slot".into()));
        }

        let next: Vec<TileId> = next.into_iter().flatten().collect();
        if next != batch.arrangement {
            return Err(inconsistent(format!(
                "batch yields {:?}, expected {:?}",
                next, batch.arrangement
            )));
        }
        self.tiles = next;
        Ok(())
    }
}

fn claim(next: &mut [Option<TileId>], slot: Slot, tile: TileId) -> Result<(), PresentationError> {
    let len = next.len();
    let cell = next
        .get_mut(slot)
        .ok_or(PresentationError::InvalidSlot { slot, len })?;
    if cell.is_some() {
        return Err(inconsistent(format!("ending slot {slot} claimed twice")));
    }
    *cell = Some(tile);
    Ok(())
}

fn inconsistent(reason: String) -> PresentationError {
    PresentationError::Inconsistent { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ids: &[u64]) -> Vec<TileId> {
        ids.iter().map(|&id| TileId(id)).collect()
    }

    fn model(ids: &[u64]) -> GridModel {
        GridModel { tiles: t(ids) }
    }

    #[test]
    fn applies_delete_move_insert() {
        // [A, B] -> [B, C]
        let mut grid = model(&[1, 2]);
        let batch = GridBatch {
            deletes: vec![0],
            moves: vec![(1, 0)],
            inserts: vec![1],
            arrangement: t(&[2, 3]),
        };
        grid.apply(&batch).expect("consistent batch");
        assert_eq!(grid.tiles(), &t(&[2, 3])[..]);
    }

    #[test]
    fn untouched_tiles_keep_relative_order() {
        // [A, B, C] -> [X, B, C]
        let mut grid = model(&[1, 2, 3]);
        let batch = GridBatch {
            deletes: vec![0],
            moves: vec![],
            inserts: vec![0],
            arrangement: t(&[9, 2, 3]),
        };
        grid.apply(&batch).expect("consistent batch");
        assert_eq!(grid.tiles(), &t(&[9, 2, 3])[..]);
    }

    #[test]
    fn rejects_out_of_range_delete() {
        let mut grid = model(&[1]);
        let batch = GridBatch { deletes: vec![0, 1], ..Default::default() };
        assert!(grid.apply(&batch).is_err());
        assert_eq!(grid.tiles(), &t(&[1])[..]);
    }

    #[test]
    fn rejects_arrangement_mismatch() {
        let mut grid = model(&[1, 2]);
        // Missing the move: survivors would land as [1, 2] instead of [2, 1].
        let batch = GridBatch { arrangement: t(&[2, 1]), ..Default::default() };
        let err = grid.apply(&batch).unwrap_err();
        assert!(matches!(err, PresentationError::Inconsistent { .. }));
    }

    #[test]
    fn rejects_double_claim() {
        let mut grid = model(&[1, 2]);
        let batch = GridBatch {
            deletes: vec![],
            moves: vec![(0, 1)],
            inserts: vec![1],
            arrangement: t(&[2, 1, 3]),
        };
        assert!(grid.apply(&batch).is_err());
    }

    #[test]
    fn empty_batch_is_noop() {
        let batch = GridBatch { arrangement: t(&[1, 2]), ..Default::default() };
        assert!(batch.is_empty());
        let mut grid = model(&[1, 2]);
        grid.apply(&batch).expect("noop");
        assert_eq!(grid.len(), 2);
    }
}
