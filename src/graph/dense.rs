use custom_debug_derive::Debug;
use nauty_Traces_sys::{ADDONEARC, SETWORDSNEEDED};
use std::alloc::Layout;

use super::{TrialInput, VertexIndex};
use crate::{debug::bin_fmt, Error};

const WORDSIZE: usize = 64;

/// Bit matrix with one row of `m` setwords per vertex.
/// Directed by construction, each arc sets exactly one bit.
#[derive(Debug)]
pub struct DenseGraph {
    #[debug(with = "bin_fmt")]
    pub adjacency_matrix: Vec<u64>,
    n: usize,
    m: usize,
}

/// Allocate `words` zeroed setwords or report that this is impossible.
fn allocate_words(words: usize) -> Result<Vec<u64>, Error> {
    let too_big = || Error::Allocation {
        what: "adjacency matrix",
        requested: words,
    };

    Layout::array::<u64>(words).map_err(|_| too_big())?;
    let mut matrix = Vec::new();
    matrix.try_reserve_exact(words).map_err(|_| too_big())?;
    matrix.resize(words, 0);

    Ok(matrix)
}

impl DenseGraph {
    /// The matrix size only depends on the number of vertices.
    pub fn build(input: &TrialInput<'_>) -> Result<DenseGraph, Error> {
        input.check()?;

        let n = input.vertex_count();
        let m = SETWORDSNEEDED(n);
        let words = n.checked_mul(m).ok_or(Error::Allocation {
            what: "adjacency matrix",
            requested: usize::MAX,
        })?;

        let mut dense_graph = DenseGraph {
            adjacency_matrix: allocate_words(words)?,
            n,
            m,
        };

        for (start, end) in input.edges().arcs() {
            ADDONEARC(
                &mut dense_graph.adjacency_matrix,
                start as usize,
                end as usize,
                m,
            );
        }

        Ok(dense_graph)
    }

    pub fn check_valid(&self) -> bool {
        self.adjacency_matrix.len() == self.n * self.m && self.m == SETWORDSNEEDED(self.n)
    }

    pub fn graph_repr_sizes(&self) -> (usize, usize) {
        (self.n, self.m)
    }

    /// nauty orders the bits of a setword starting with the most significant one.
    pub fn has_arc(&self, start: VertexIndex, end: VertexIndex) -> bool {
        let (start, end) = (start as usize, end as usize);
        if start >= self.n || end >= self.n {
            return false;
        }

        let word = self.adjacency_matrix[start * self.m + end / WORDSIZE];
        word & (1u64 << (WORDSIZE - 1 - end % WORDSIZE)) != 0
    }

    pub fn arc_count(&self) -> usize {
        self.adjacency_matrix
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }
}
