//! The compact colouring encoding shared by all backends.
//!
//! A colouring of `n` vertices is a sequence of `n` signed integers
//! that lists every vertex exactly once, shifted up by one. A negative
//! entry `-(v + 1)` starts a new block with vertex `v`, a positive entry
//! `v + 1` adds vertex `v` to the current block. The first entry always
//! starts the first block, whatever its sign.
//!
//! nauty style encodings negate the last entry of a block instead, see
//! [`BlockMarker::Last`]. There an unmarked tail still forms a last block.

use itertools::Itertools;
use std::borrow::Cow;

use crate::{
    debug::MalformedInput,
    graph::VertexIndex,
    partition::{InsertMode, PartitionNest},
};

/// Vertex referenced by an entry and whether it starts a block.
fn decode_entry(entry: VertexIndex) -> (i64, bool) {
    let entry = entry as i64;
    if entry < 0 {
        (-entry - 1, true)
    } else {
        (entry - 1, false)
    }
}

/// Which entry of a block is negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMarker {
    First,
    Last,
}

impl Default for BlockMarker {
    fn default() -> Self {
        Self::First
    }
}

/// Validated colouring encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colouring<'a> {
    entries: Cow<'a, [VertexIndex]>,
    marker: BlockMarker,
}

/// `labels[i]` is the vertex at position `i`, `block_flags[i]`
/// is 0 if a new block starts at position `i` and 1 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPartition {
    pub labels: Vec<VertexIndex>,
    pub block_flags: Vec<VertexIndex>,
}

impl<'a> Colouring<'a> {
    /// Fails fast for encodings that are not a partition of `[0, n)`.
    pub fn parse(raw: &'a [VertexIndex], n: usize) -> Result<Self, MalformedInput> {
        Self::parse_with(raw, n, BlockMarker::First)
    }

    pub fn parse_with(
        raw: &'a [VertexIndex],
        n: usize,
        marker: BlockMarker,
    ) -> Result<Self, MalformedInput> {
        if n == 0 {
            return Err(MalformedInput::EmptyGraph);
        }
        if raw.len() != n {
            return Err(MalformedInput::ColouringLength {
                expected: n,
                found: raw.len(),
            });
        }

        // n entries without duplicates also means no vertex is missing.
        let mut seen = vec![false; n];
        for (position, entry) in raw.iter().enumerate() {
            let (vertex, _) = decode_entry(*entry);
            if vertex < 0 || vertex >= n as i64 {
                return Err(MalformedInput::VertexOutOfRange {
                    position,
                    entry: *entry as i64,
                    size: n,
                });
            }

            let seen_before = &mut seen[vertex as usize];
            if *seen_before {
                return Err(MalformedInput::DuplicateVertex(vertex as VertexIndex));
            }
            *seen_before = true;
        }

        Ok(Colouring {
            entries: Cow::Borrowed(raw),
            marker,
        })
    }

    /// A single block with all vertices in index order.
    pub fn unit(n: usize) -> Result<Colouring<'static>, MalformedInput> {
        if n == 0 {
            return Err(MalformedInput::EmptyGraph);
        }

        let entries = (1..=n as VertexIndex)
            .map(|entry| if entry == 1 { -entry } else { entry })
            .collect::<Vec<_>>();
        Ok(Colouring {
            entries: Cow::Owned(entries),
            marker: BlockMarker::First,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vertices in encoding order, paired with whether they start a block.
    pub fn iter(&self) -> impl Iterator<Item = (VertexIndex, bool)> + '_ {
        let entries = &self.entries;
        let marker = self.marker;

        entries.iter().enumerate().map(move |(position, entry)| {
            let (vertex, negated) = decode_entry(*entry);
            let starts_block = match marker {
                BlockMarker::First => negated,
                BlockMarker::Last => position > 0 && entries[position - 1] < 0,
            };
            (vertex as VertexIndex, starts_block || position == 0)
        })
    }

    pub fn blocks(&self) -> Vec<Vec<VertexIndex>> {
        let mut blocks: Vec<Vec<VertexIndex>> = Vec::new();
        for (vertex, starts_block) in self.iter() {
            match blocks.last_mut() {
                Some(block) if !starts_block => block.push(vertex),
                _ => blocks.push(vec![vertex]),
            }
        }
        blocks
    }

    pub fn label_partition(&self) -> LabelPartition {
        let (labels, block_flags) = self
            .iter()
            .map(|(vertex, starts_block)| (vertex, if starts_block { 0 } else { 1 }))
            .unzip();

        LabelPartition {
            labels,
            block_flags,
        }
    }

    /// Replace the contents of `nest` with the vertices and insert
    /// a boundary before every block but the first. In incremental mode
    /// the boundaries are only committed as one level at the end.
    pub(crate) fn populate(&self, nest: &mut PartitionNest, mode: InsertMode) {
        nest.reset(self.len());

        for (position, (vertex, starts_block)) in self.iter().enumerate() {
            nest.write_element(position, vertex);

            if starts_block && position > 0 {
                match mode {
                    InsertMode::Bulk => {
                        nest.breakout(position);
                    }
                    InsertMode::Incremental => nest.queue_boundary(position),
                }
            }
        }

        if mode == InsertMode::Incremental {
            nest.advance_level();
        }
    }
}

impl LabelPartition {
    /// nauty and Traces mark the last position of a cell
    /// with 0 instead of the first one.
    pub fn nauty_ptn(&self) -> Vec<VertexIndex> {
        let mut ptn = self
            .block_flags
            .iter()
            .skip(1)
            .map(|flag| if *flag == 0 { 0 } else { 1 })
            .collect::<Vec<_>>();
        ptn.push(0);
        ptn
    }
}

/// Encode blocks of vertices. Each block is sorted and its smallest
/// vertex is the negated entry. Empty blocks are dropped.
pub fn encode_blocks(blocks: &[Vec<VertexIndex>]) -> Vec<VertexIndex> {
    blocks
        .iter()
        .filter(|block| !block.is_empty())
        .flat_map(|block| {
            block
                .iter()
                .sorted()
                .enumerate()
                .map(|(index, vertex)| if index == 0 { -vertex - 1 } else { vertex + 1 })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_block() -> Result<(), MalformedInput> {
        let raw = [-1, 2, 3, 4];
        let colouring = Colouring::parse(&raw, 4)?;

        assert_eq!(vec![vec![0, 1, 2, 3]], colouring.blocks());
        let label_partition = colouring.label_partition();
        assert_eq!(vec![0, 1, 2, 3], label_partition.labels);
        assert_eq!(vec![0, 1, 1, 1], label_partition.block_flags);
        assert_eq!(vec![1, 1, 1, 0], label_partition.nauty_ptn());

        Ok(())
    }

    #[test]
    fn test_singletons() -> Result<(), MalformedInput> {
        let raw = [-1, -2, 3];
        let colouring = Colouring::parse(&raw, 3)?;

        assert_eq!(vec![vec![0], vec![1, 2]], colouring.blocks());

        let raw = [-1, -2, -3];
        let colouring = Colouring::parse(&raw, 3)?;
        assert_eq!(vec![vec![0], vec![1], vec![2]], colouring.blocks());
        let label_partition = colouring.label_partition();
        assert_eq!(vec![0, 1, 2], label_partition.labels);
        assert_eq!(vec![0, 0, 0], label_partition.block_flags);
        assert_eq!(vec![0, 0, 0], label_partition.nauty_ptn());

        Ok(())
    }

    #[test]
    fn test_last_entry_marker() -> Result<(), MalformedInput> {
        let raw = [-1, -2, 3];
        let colouring = Colouring::parse_with(&raw, 3, BlockMarker::Last)?;
        assert_eq!(vec![vec![0], vec![1], vec![2]], colouring.blocks());
        assert_eq!(vec![0, 0, 0], colouring.label_partition().block_flags);

        // Blocks {3, 0} and {1, 2} with the last entry of each negated.
        let raw = [4, -1, 2, -3];
        let colouring = Colouring::parse_with(&raw, 4, BlockMarker::Last)?;
        assert_eq!(vec![vec![3, 0], vec![1, 2]], colouring.blocks());
        assert_eq!(vec![1, 0, 1, 0], colouring.label_partition().nauty_ptn());

        assert_eq!(
            Err(MalformedInput::DuplicateVertex(0)),
            Colouring::parse_with(&[-1, -1], 2, BlockMarker::Last)
        );
        Ok(())
    }

    #[test]
    fn test_first_entry_always_starts_block() -> Result<(), MalformedInput> {
        let positive_first = [3, 1, -2];
        let negative_first = [-3, 1, -2];

        let positive = Colouring::parse(&positive_first, 3)?;
        let negative = Colouring::parse(&negative_first, 3)?;
        assert_eq!(vec![vec![2, 0], vec![1]], positive.blocks());
        assert_eq!(positive.blocks(), negative.blocks());
        assert_eq!(positive.label_partition(), negative.label_partition());

        Ok(())
    }

    #[test]
    fn test_blocks_cover_all_vertices() -> Result<(), MalformedInput> {
        let raw = [-5, 1, -3, -2, 4, 6, -7];
        let colouring = Colouring::parse(&raw, 7)?;

        let mut covered = colouring.blocks().into_iter().flatten().collect::<Vec<_>>();
        covered.sort_unstable();
        assert_eq!((0..7).collect::<Vec<VertexIndex>>(), covered);
        assert_eq!(4, colouring.blocks().len());

        Ok(())
    }

    #[test]
    fn test_malformed_colourings() {
        assert_eq!(
            Err(MalformedInput::ColouringLength {
                expected: 3,
                found: 2
            }),
            Colouring::parse(&[-1, 2], 3)
        );
        assert_eq!(
            Err(MalformedInput::VertexOutOfRange {
                position: 1,
                entry: 4,
                size: 3
            }),
            Colouring::parse(&[-1, 4, 2], 3)
        );
        assert_eq!(
            Err(MalformedInput::VertexOutOfRange {
                position: 2,
                entry: 0,
                size: 3
            }),
            Colouring::parse(&[-1, 2, 0], 3)
        );
        assert_eq!(
            Err(MalformedInput::DuplicateVertex(1)),
            Colouring::parse(&[-1, 2, -2], 3)
        );
        assert_eq!(
            Err(MalformedInput::VertexOutOfRange {
                position: 0,
                entry: VertexIndex::MIN as i64,
                size: 1
            }),
            Colouring::parse(&[VertexIndex::MIN], 1)
        );
        assert_eq!(Err(MalformedInput::EmptyGraph), Colouring::parse(&[], 0));
    }

    #[test]
    fn test_unit_colouring() -> Result<(), MalformedInput> {
        let unit = Colouring::unit(5)?;
        assert_eq!(vec![vec![0, 1, 2, 3, 4]], unit.blocks());
        assert_eq!(
            Colouring::parse(&[-1, 2, 3, 4, 5], 5)?.label_partition(),
            unit.label_partition()
        );
        assert_eq!(Err(MalformedInput::EmptyGraph), Colouring::unit(0));

        Ok(())
    }

    #[test]
    fn test_encode_blocks() -> Result<(), MalformedInput> {
        let blocks = vec![vec![3, 1], vec![], vec![0], vec![4, 2]];
        let encoded = encode_blocks(&blocks);
        assert_eq!(vec![-2, 4, -1, -3, 5], encoded);

        let colouring = Colouring::parse(&encoded, 5)?;
        assert_eq!(vec![vec![1, 3], vec![0], vec![2, 4]], colouring.blocks());

        Ok(())
    }

    #[test]
    fn test_populate_replaces_nest() -> Result<(), MalformedInput> {
        let raw = [-1, 2, -3];
        let colouring = Colouring::parse(&raw, 3)?;
        let expected = vec![vec![0, 1], vec![2]];

        for mode in [InsertMode::Bulk, InsertMode::Incremental].iter() {
            let mut nest = PartitionNest::unit(3);
            nest.breakout(1);
            nest.queue_boundary(1);
            colouring.populate(&mut nest, *mode);
            assert_eq!(expected, nest.cells().map(<[_]>::to_vec).collect::<Vec<_>>());
            assert!(!nest.has_pending());

            let mut shorter = PartitionNest::unit(2);
            colouring.populate(&mut shorter, *mode);
            assert_eq!(nest, shorter);
        }
        Ok(())
    }
}
