use crate::core::geo::TileRef;
use crate::prelude::HashSet;

/// Difference between two tile lists, keyed by tile identity.
///
/// Position in the list never matters: a tile that moves from index 3 to
/// index 0 during a pan is `retained`, not removed and re-added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileDelta {
    /// In the new list only, in new-list order
    pub added: Vec<TileRef>,
    /// In the old list only, in old-list order
    pub removed: Vec<TileRef>,
    /// In both lists, in new-list order
    pub retained: Vec<TileRef>,
}

impl TileDelta {
    pub fn between(old: &[TileRef], new: &[TileRef]) -> Self {
        let old_set: HashSet<TileRef> = old.iter().copied().collect();
        let new_set: HashSet<TileRef> = new.iter().copied().collect();

        let (retained, added): (Vec<TileRef>, Vec<TileRef>) =
            new.iter().copied().partition(|tile| old_set.contains(tile));
        let removed = old
            .iter()
            .filter(|tile| !new_set.contains(tile))
            .copied()
            .collect();

        Self {
            added,
            removed,
            retained,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
