//! Disjoint-set forest over region identifiers
//!
//! Flat parent-index arena (no heap-linked nodes, no ownership cycles):
//! "parent of x" is `parent[x]`. Union by size keeps trees shallow; finds
//! compress paths as they walk. Each root carries the aggregate of every
//! region that merged into it — total pixel mass and the union of their
//! bounding boxes.

use super::flood::RegionRecord;
use super::grid::Bounds;

/// Aggregate of all regions sharing one root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionAggregate {
    /// Total pixels across every merged region
    pub pixels: u64,
    /// Union of the merged bounding boxes; `None` for identifiers that
    /// were drawn but never claimed a pixel
    pub bounds: Option<Bounds>,
}

impl RegionAggregate {
    fn absorb(&mut self, other: RegionAggregate) {
        self.pixels += other.pixels;
        self.bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(Bounds::merge(a, b)),
            (a, b) => a.or(b),
        };
    }
}

/// Weighted union-find with path compression over region identifiers.
///
/// Entry 0 is reserved and never used by any region; identifiers issued
/// by the labeling counter start at 1.
pub struct RegionForest {
    parent: Vec<u32>,
    size: Vec<u32>,
    area: Vec<RegionAggregate>,
}

impl RegionForest {
    /// Build a forest for identifiers `1..=id_count`, seeding aggregates
    /// from the per-chunk region records.
    #[must_use]
    pub fn from_records<'a>(
        id_count: u32,
        records: impl IntoIterator<Item = &'a RegionRecord>,
    ) -> Self {
        let len = id_count as usize + 1;
        let mut forest = Self {
            parent: (0..len as u32).collect(),
            size: vec![1; len],
            area: vec![RegionAggregate::default(); len],
        };

        for record in records {
            assert!(
                record.id >= 1 && (record.id as usize) < len,
                "region id {} outside forest range (1..={})",
                record.id,
                id_count
            );
            forest.area[record.id as usize] = RegionAggregate {
                pixels: record.pixels,
                bounds: Some(record.bounds),
            };
        }

        forest
    }

    /// Number of usable identifiers (entry 0 excluded).
    #[must_use]
    pub fn id_count(&self) -> u32 {
        self.parent.len() as u32 - 1
    }

    fn check_range(&self, id: u32) {
        assert!(
            (id as usize) < self.parent.len(),
            "region id {} outside forest range (0..={})",
            id,
            self.parent.len() - 1
        );
    }

    /// Root of `id`'s tree, compressing the walked path.
    pub fn find(&mut self, id: u32) -> u32 {
        self.check_range(id);
        let mut current = id;
        while self.parent[current as usize] != current {
            // Redirect each walked node past its parent, halving future walks.
            self.parent[current as usize] = self.parent[self.parent[current as usize] as usize];
            current = self.parent[current as usize];
        }
        current
    }

    /// Merge the sets of `a` and `b`. The smaller tree is re-parented
    /// under the larger (ties toward `a`'s root), and the surviving root
    /// absorbs the other's aggregate. Already-united pairs are a no-op.
    pub fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        let (winner, loser) = if self.size[root_b as usize] > self.size[root_a as usize] {
            (root_b, root_a)
        } else {
            (root_a, root_b)
        };

        let absorbed = self.area[loser as usize];
        self.area[winner as usize].absorb(absorbed);
        self.parent[loser as usize] = winner;
        self.size[winner as usize] += self.size[loser as usize];
    }

    /// Whether two identifiers currently share a root.
    pub fn connected(&mut self, a: u32, b: u32) -> bool {
        self.find(a) == self.find(b)
    }

    /// Aggregate of the set containing `id`.
    pub fn area(&mut self, id: u32) -> RegionAggregate {
        let root = self.find(id);
        self.area[root as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, pixels: u64, bounds: Bounds) -> RegionRecord {
        RegionRecord { id, pixels, bounds }
    }

    fn sample_forest() -> RegionForest {
        let records = [
            record(1, 10, Bounds { top: 0, bottom: 4, left: 0, right: 4 }),
            record(2, 3, Bounds { top: 5, bottom: 6, left: 2, right: 3 }),
            record(3, 7, Bounds { top: 0, bottom: 1, left: 8, right: 9 }),
        ];
        RegionForest::from_records(3, records.iter())
    }

    #[test]
    fn test_fresh_forest_has_singleton_sets() {
        let mut forest = sample_forest();
        assert_eq!(forest.id_count(), 3);
        for id in 1..=3 {
            assert_eq!(forest.find(id), id);
        }
        assert!(!forest.connected(1, 2));
        assert_eq!(forest.area(1).pixels, 10);
        assert_eq!(forest.area(2).pixels, 3);
    }

    #[test]
    fn test_union_merges_aggregates() {
        let mut forest = sample_forest();
        forest.union(1, 2);

        assert!(forest.connected(1, 2));
        let area = forest.area(2);
        assert_eq!(area.pixels, 13);
        assert_eq!(
            area.bounds.unwrap(),
            Bounds { top: 0, bottom: 6, left: 0, right: 4 }
        );
        // Region 3 untouched
        assert_eq!(forest.area(3).pixels, 7);
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut forest = sample_forest();
        forest.union(1, 2);
        let root = forest.find(1);
        let area = forest.area(1);

        forest.union(1, 2);
        forest.union(2, 1);

        assert_eq!(forest.find(1), root);
        assert_eq!(forest.find(2), root);
        assert_eq!(forest.area(1), area);
    }

    #[test]
    fn test_union_by_size_attaches_smaller_under_larger() {
        let mut forest = sample_forest();
        // {1,2} has tree size 2; 3 is a singleton
        forest.union(1, 2);
        let big_root = forest.find(1);

        // Named first or second, the singleton joins the larger tree
        forest.union(3, 1);
        assert_eq!(forest.find(3), big_root);
    }

    #[test]
    fn test_transitive_merge_accumulates_everything() {
        let mut forest = sample_forest();
        forest.union(1, 2);
        forest.union(2, 3);

        let area = forest.area(1);
        assert_eq!(area.pixels, 20);
        assert_eq!(
            area.bounds.unwrap(),
            Bounds { top: 0, bottom: 6, left: 0, right: 9 }
        );
        assert!(forest.connected(1, 3));
    }

    #[test]
    fn test_unrecorded_ids_carry_no_mass() {
        let records = [record(2, 5, Bounds::at(1, 1))];
        let mut forest = RegionForest::from_records(3, records.iter());
        assert_eq!(forest.area(1).pixels, 0);
        assert_eq!(forest.area(1).bounds, None);
        assert_eq!(forest.area(3).pixels, 0);

        // Merging an empty id into a real one leaves the mass unchanged
        forest.union(1, 2);
        assert_eq!(forest.area(2).pixels, 5);
        assert_eq!(forest.area(2).bounds, Some(Bounds::at(1, 1)));
    }

    #[test]
    #[should_panic(expected = "outside forest range")]
    fn test_out_of_range_find_fails_loudly() {
        let mut forest = sample_forest();
        let _ = forest.find(17);
    }

    #[test]
    #[should_panic(expected = "outside forest range")]
    fn test_out_of_range_record_fails_loudly() {
        let records = [record(9, 1, Bounds::at(0, 0))];
        let _ = RegionForest::from_records(3, records.iter());
    }
}
