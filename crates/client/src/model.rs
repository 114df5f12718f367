//! What the grid shows: labeled cells, the current path and the user marker.
use std::collections::BTreeSet;

use gridloc_shared::grid::{Cell, GridSpec};
use tracing::warn;

/// Owned copy of the model, safe to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub visited: BTreeSet<Cell>,
    pub path: Vec<Cell>,
    pub user_location: Option<Cell>,
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct RenderModel {
    spec: GridSpec,
    visited: BTreeSet<Cell>,
    path: Vec<Cell>,
    user_location: Option<Cell>,
    revision: u64,
}

impl RenderModel {
    /// Empty model. `start` is the initial marker; pass `None` for no marker.
    pub fn new(spec: GridSpec, start: Option<Cell>) -> Self {
        RenderModel {
            spec,
            visited: BTreeSet::new(),
            path: Vec::new(),
            user_location: start.filter(|c| spec.contains(*c)),
            revision: 0,
        }
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn visited(&self) -> &BTreeSet<Cell> {
        &self.visited
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn user_location(&self) -> Option<Cell> {
        self.user_location
    }

    /// Bumped on every mutation that changed something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Union `cells` into the visited set. Out-of-range cells are skipped.
    /// Returns how many cells were new.
    pub fn mark_visited(&mut self, cells: impl IntoIterator<Item = Cell>) -> usize {
        let mut added = 0;
        for cell in cells {
            if !self.spec.contains(cell) {
                warn!(%cell, "ignoring out-of-range visited cell");
                continue;
            }
            if self.visited.insert(cell) {
                added += 1;
            }
        }
        if added > 0 {
            self.revision += 1;
        }
        added
    }

    /// Replace the path. Rejected whole if any cell is out of range.
    pub fn set_path(&mut self, path: Vec<Cell>) -> bool {
        if let Some(bad) = path.iter().find(|c| !self.spec.contains(**c)) {
            warn!(cell = %bad, len = path.len(), "rejecting path with out-of-range cell");
            return false;
        }
        if self.path != path {
            self.path = path;
            self.revision += 1;
        }
        true
    }

    /// Move or clear the user marker. Out-of-range cells are rejected.
    pub fn set_user_location(&mut self, location: Option<Cell>) -> bool {
        if let Some(cell) = location {
            if !self.spec.contains(cell) {
                warn!(%cell, "rejecting out-of-range user location");
                return false;
            }
        }
        if self.user_location != location {
            self.user_location = location;
            self.revision += 1;
        }
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            visited: self.visited.clone(),
            path: self.path.clone(),
            user_location: self.user_location,
            revision: self.revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RenderModel {
        RenderModel::new(GridSpec::default(), Some(Cell::new(1, 7)))
    }

    #[test]
    fn test_new_model() {
        let m = model();
        assert!(m.visited().is_empty());
        assert!(m.path().is_empty());
        assert_eq!(m.user_location(), Some(Cell::new(1, 7)));
        assert_eq!(m.revision(), 0);
    }

    #[test]
    fn test_new_model_drops_out_of_range_start() {
        let m = RenderModel::new(GridSpec::new(4, 100.0), Some(Cell::new(1, 7)));
        assert_eq!(m.user_location(), None);
    }

    #[test]
    fn test_mark_visited_dedupes() {
        let mut m = model();
        let added = m.mark_visited([Cell::new(3, 4), Cell::new(3, 4)]);
        assert_eq!(added, 1);
        assert_eq!(m.visited().len(), 1);
        assert!(m.is_visited(Cell::new(3, 4)));
    }

    #[test]
    fn test_mark_visited_idempotent() {
        let cells = [Cell::new(1, 1), Cell::new(16, 16), Cell::new(8, 2)];
        let mut once = model();
        once.mark_visited(cells);
        let mut twice = model();
        twice.mark_visited(cells);
        let rev = twice.revision();
        assert_eq!(twice.mark_visited(cells), 0);
        assert_eq!(twice.revision(), rev);
        assert_eq!(once.visited(), twice.visited());
    }

    #[test]
    fn test_mark_visited_skips_out_of_range() {
        let mut m = model();
        let added = m.mark_visited([Cell::new(0, 3), Cell::new(2, 2), Cell::new(17, 1)]);
        assert_eq!(added, 1);
        assert_eq!(m.visited().iter().copied().collect::<Vec<_>>(), vec![Cell::new(2, 2)]);
    }

    #[test]
    fn test_set_path_replaces() {
        let mut m = model();
        let p = vec![Cell::new(1, 1), Cell::new(1, 2)];
        let q = vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
        assert!(m.set_path(p));
        assert!(m.set_path(q.clone()));
        assert_eq!(m.path(), q.as_slice());
    }

    #[test]
    fn test_set_path_empty_clears() {
        let mut m = model();
        m.set_path(vec![Cell::new(1, 1)]);
        assert!(m.set_path(vec![]));
        assert!(m.path().is_empty());
    }

    #[test]
    fn test_set_path_rejects_out_of_range() {
        let mut m = model();
        let p = vec![Cell::new(1, 1), Cell::new(1, 2)];
        m.set_path(p.clone());
        let rev = m.revision();
        assert!(!m.set_path(vec![Cell::new(2, 2), Cell::new(2, 17)]));
        assert_eq!(m.path(), p.as_slice());
        assert_eq!(m.revision(), rev);
    }

    #[test]
    fn test_set_user_location() {
        let mut m = model();
        assert!(m.set_user_location(Some(Cell::new(4, 9))));
        assert_eq!(m.user_location(), Some(Cell::new(4, 9)));
        assert!(!m.set_user_location(Some(Cell::new(20, 1))));
        assert_eq!(m.user_location(), Some(Cell::new(4, 9)));
        assert!(m.set_user_location(None));
        assert_eq!(m.user_location(), None);
    }

    #[test]
    fn test_revision_only_on_change() {
        let mut m = model();
        m.set_user_location(Some(Cell::new(1, 7)));
        assert_eq!(m.revision(), 0);
        m.set_user_location(Some(Cell::new(2, 7)));
        assert_eq!(m.revision(), 1);
        m.set_path(vec![]);
        assert_eq!(m.revision(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut m = model();
        m.mark_visited([Cell::new(3, 4)]);
        let snap = m.snapshot();
        m.mark_visited([Cell::new(5, 5)]);
        assert_eq!(snap.visited.len(), 1);
        assert_eq!(snap.user_location, Some(Cell::new(1, 7)));
        assert_eq!(snap.revision, 1);
    }
}
