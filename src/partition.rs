//! Ordered partitions that can be refined cell by cell.

use custom_debug_derive::Debug;
use itertools::Itertools;

use crate::{colouring::Colouring, graph::VertexIndex};

/// How boundaries found while decoding a colouring are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Every boundary is fixed as soon as it is found.
    Bulk,
    /// Boundaries are queued and fixed together as one level.
    Incremental,
}

impl Default for InsertMode {
    fn default() -> Self {
        Self::Bulk
    }
}

/// An ordered partition of `n` elements, called partition nest
/// since each committed level refines the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNest {
    elements: Vec<VertexIndex>,
    /// `cell_start[i]` if a cell begins at position `i`.
    #[debug(skip)]
    cell_start: Vec<bool>,
    pending: Vec<usize>,
    /// Number of cells after each committed level.
    levels: Vec<usize>,
}

impl PartitionNest {
    /// The unit partition: identity order, one cell.
    pub fn unit(n: usize) -> Self {
        let mut nest = PartitionNest {
            elements: Vec::new(),
            cell_start: Vec::new(),
            pending: Vec::new(),
            levels: Vec::new(),
        };
        nest.reset(n);
        nest
    }

    pub fn from_colouring(colouring: &Colouring<'_>, mode: InsertMode) -> Self {
        let mut nest = Self::unit(0);
        colouring.populate(&mut nest, mode);
        nest
    }

    /// Back to the unit partition of `n` elements, keeping the buffers.
    pub(crate) fn reset(&mut self, n: usize) {
        self.elements.clear();
        self.elements.extend(0..n as VertexIndex);
        self.cell_start.clear();
        self.cell_start.resize(n, false);
        if let Some(first) = self.cell_start.first_mut() {
            *first = true;
        }
        self.pending.clear();
        self.levels.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[VertexIndex] {
        &self.elements
    }

    pub(crate) fn write_element(&mut self, position: usize, vertex: VertexIndex) {
        self.elements[position] = vertex;
    }

    /// Fix a cell boundary before `position` right away.
    /// Returns whether a new cell was created.
    pub fn breakout(&mut self, position: usize) -> bool {
        match self.cell_start.get_mut(position) {
            Some(start) if position > 0 && !*start => {
                *start = true;
                true
            }
            _ => false,
        }
    }

    /// Remember a boundary before `position` for the next level.
    /// Positions that cannot start a non-empty cell are ignored.
    pub fn queue_boundary(&mut self, position: usize) {
        if position > 0 && position < self.len() {
            self.pending.push(position);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Commit all queued boundaries as a new level.
    /// Without queued boundaries nothing happens and `false` is returned.
    pub fn advance_level(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_unstable();
        pending.dedup();
        for position in pending {
            self.breakout(position);
        }
        self.levels.push(self.cell_count());

        true
    }

    /// Number of committed levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub fn cell_count(&self) -> usize {
        self.cell_start.iter().filter(|start| **start).count()
    }

    pub fn cell_starts(&self) -> Vec<usize> {
        self.cell_start.iter().positions(|start| *start).collect()
    }

    /// `(start, end)` of each cell, end exclusive.
    pub fn cell_bounds(&self) -> Vec<(usize, usize)> {
        self.cell_starts()
            .into_iter()
            .chain(std::iter::once(self.len()))
            .tuple_windows()
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &[VertexIndex]> + '_ {
        self.cell_bounds()
            .into_iter()
            .map(move |(start, end)| &self.elements[start..end])
    }

    /// Start position of the cell of every vertex, indexed by vertex.
    pub fn cell_of_vertices(&self) -> Vec<usize> {
        let mut cell_of = vec![0; self.len()];
        let mut current = 0;
        for (position, vertex) in self.elements.iter().enumerate() {
            if self.cell_start[position] {
                current = position;
            }
            cell_of[*vertex as usize] = current;
        }
        cell_of
    }

    pub(crate) fn cell_mut(&mut self, start: usize, end: usize) -> &mut [VertexIndex] {
        &mut self.elements[start..end]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{colouring::BlockMarker, debug::MalformedInput};
    use itertools::Itertools;

    #[test]
    fn test_unit_partition() {
        let nest = PartitionNest::unit(4);
        assert_eq!(&[0, 1, 2, 3], nest.elements());
        assert_eq!(vec![0], nest.cell_starts());
        assert_eq!(1, nest.cell_count());
        assert_eq!(0, nest.level_count());
        assert_eq!(vec![&[0, 1, 2, 3][..]], nest.cells().collect::<Vec<_>>());
    }

    #[test]
    fn test_breakout() {
        let mut nest = PartitionNest::unit(4);
        assert!(nest.breakout(2));
        assert!(!nest.breakout(2));
        assert!(!nest.breakout(0));
        assert!(!nest.breakout(4));
        assert_eq!(vec![(0, 2), (2, 4)], nest.cell_bounds());
        assert_eq!(vec![0, 0, 2, 2], nest.cell_of_vertices());
    }

    #[test]
    fn test_advance_level() {
        let mut nest = PartitionNest::unit(5);
        assert!(!nest.advance_level());
        assert_eq!(0, nest.level_count());

        nest.queue_boundary(3);
        nest.queue_boundary(1);
        nest.queue_boundary(3);
        nest.queue_boundary(0);
        nest.queue_boundary(5);
        assert!(nest.has_pending());
        assert_eq!(1, nest.cell_count());

        assert!(nest.advance_level());
        assert!(!nest.has_pending());
        assert_eq!(vec![0, 1, 3], nest.cell_starts());
        assert_eq!(&[3], nest.levels());

        assert!(!nest.advance_level());
        assert_eq!(1, nest.level_count());
    }

    #[test]
    fn test_single_block_colouring() -> Result<(), MalformedInput> {
        let raw = [-1, 2, 3, 4];
        let colouring = Colouring::parse(&raw, 4)?;
        let nest = PartitionNest::from_colouring(&colouring, InsertMode::Bulk);

        assert_eq!(vec![&[0, 1, 2, 3][..]], nest.cells().collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_three_singletons() -> Result<(), MalformedInput> {
        let raw = [-1, -2, -3];
        let colouring = Colouring::parse(&raw, 3)?;

        for mode in [InsertMode::Bulk, InsertMode::Incremental].iter() {
            let nest = PartitionNest::from_colouring(&colouring, *mode);
            assert_eq!(
                vec![&[0][..], &[1][..], &[2][..]],
                nest.cells().collect::<Vec<_>>()
            );
        }
        Ok(())
    }

    #[test]
    fn test_reset() {
        let mut nest = PartitionNest::unit(3);
        nest.breakout(1);
        nest.queue_boundary(2);
        nest.advance_level();
        nest.queue_boundary(1);

        nest.reset(5);
        assert_eq!(PartitionNest::unit(5), nest);
        assert!(!nest.has_pending());
        assert_eq!(0, nest.level_count());
    }

    #[test]
    fn test_bulk_and_incremental_agree() -> Result<(), MalformedInput> {
        let encodings: Vec<Vec<VertexIndex>> = vec![
            vec![-1],
            vec![-1, 2, 3, 4],
            vec![-1, -2, 3],
            vec![-4, 2, -1, -3, 5, 6],
            vec![3, -1, -2],
            vec![-6, -5, -4, -3, -2, -1],
        ];

        for raw in encodings.iter() {
            let colouring = Colouring::parse(raw, raw.len())?;
            let bulk = PartitionNest::from_colouring(&colouring, InsertMode::Bulk);
            let incremental = PartitionNest::from_colouring(&colouring, InsertMode::Incremental);

            assert_eq!(bulk.elements(), incremental.elements());
            assert_eq!(bulk.cell_starts(), incremental.cell_starts());
            assert_eq!(
                bulk.cells().collect::<Vec<_>>(),
                incremental.cells().collect::<Vec<_>>()
            );
            assert_eq!(colouring.blocks().len(), bulk.cell_count());
            assert!(incremental.level_count() <= 1);
        }
        Ok(())
    }

    /// All sign patterns of all orders of `0..n`, i.e. every
    /// well-formed colouring of `n` vertices.
    fn all_encodings(n: usize) -> Vec<Vec<VertexIndex>> {
        (0..n as VertexIndex)
            .permutations(n)
            .flat_map(|order| {
                (0..1u32 << n).map(move |signs| {
                    order
                        .iter()
                        .enumerate()
                        .map(|(position, vertex)| {
                            if signs & (1 << position) != 0 {
                                -vertex - 1
                            } else {
                                vertex + 1
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect()
    }

    #[test]
    fn test_all_small_colourings() -> Result<(), MalformedInput> {
        for n in 1..=5 {
            let encodings = all_encodings(n);
            assert_eq!((1..=n).product::<usize>() << n, encodings.len());

            for raw in encodings.iter() {
                for marker in [BlockMarker::First, BlockMarker::Last].iter() {
                    let colouring = Colouring::parse_with(raw, n, *marker)?;
                    let blocks = colouring.blocks();

                    let mut covered = blocks.iter().flatten().copied().collect::<Vec<_>>();
                    covered.sort_unstable();
                    assert_eq!((0..n as VertexIndex).collect::<Vec<_>>(), covered);
                    assert!(blocks.iter().all(|block| !block.is_empty()));

                    let bulk = PartitionNest::from_colouring(&colouring, InsertMode::Bulk);
                    let incremental = PartitionNest::from_colouring(&colouring, InsertMode::Incremental);
                    assert_eq!(bulk.elements(), incremental.elements());
                    assert_eq!(bulk.cell_starts(), incremental.cell_starts());
                    assert_eq!(
                        blocks,
                        bulk.cells().map(<[_]>::to_vec).collect::<Vec<_>>()
                    );
                }
            }
        }
        Ok(())
    }
}
