//! Iterated equitable refinement, the in crate counterpart
//! of a partition nest based canonisation tool.
use custom_debug_derive::Debug;
use nauty_Traces_sys::SparseGraph;
use tracing::debug;

use super::Backend;
use crate::{
    graph::{build_sparse, TrialInput, VertexIndex},
    partition::{InsertMode, PartitionNest},
    Error,
};

/// Refines the colouring with the graph until the partition is equitable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Refiner {
    /// How the colouring is inserted into the partition nest.
    pub mode: InsertMode,
}

#[derive(Debug)]
pub struct RefinementInput {
    #[debug(skip)]
    pub graph: SparseGraph,
    pub nest: PartitionNest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    /// Number of cells after each refinement round.
    pub trace: Vec<usize>,
    pub nest: PartitionNest,
}

/// Cell starts of the out- and in-neighbours, both sorted.
type Signature = (Vec<usize>, Vec<usize>);

fn in_neighbours(graph: &SparseGraph, n: usize) -> Vec<Vec<VertexIndex>> {
    let mut reverse = vec![Vec::new(); n];
    for start in 0..n {
        for end in out_neighbours(graph, start as VertexIndex) {
            reverse[*end as usize].push(start as VertexIndex);
        }
    }
    reverse
}

fn out_neighbours(graph: &SparseGraph, vertex: VertexIndex) -> &[VertexIndex] {
    let offset = graph.v[vertex as usize] as usize;
    let degree = graph.d[vertex as usize] as usize;
    &graph.e[offset..offset + degree]
}

/// Split every cell by the signature of its vertices and commit all
/// splits of one round as a level, until a round splits nothing.
/// Returns the number of cells after each level.
pub fn refine(graph: &SparseGraph, nest: &mut PartitionNest) -> Vec<usize> {
    let reverse = in_neighbours(graph, nest.len());
    let mut trace = Vec::new();

    loop {
        let cell_of = nest.cell_of_vertices();
        let signature = |vertex: VertexIndex| -> Signature {
            let mut outgoing = out_neighbours(graph, vertex)
                .iter()
                .map(|end| cell_of[*end as usize])
                .collect::<Vec<_>>();
            let mut incoming = reverse[vertex as usize]
                .iter()
                .map(|start| cell_of[*start as usize])
                .collect::<Vec<_>>();
            outgoing.sort_unstable();
            incoming.sort_unstable();
            (outgoing, incoming)
        };

        for (start, end) in nest.cell_bounds() {
            if end - start < 2 {
                continue;
            }

            let mut keyed = nest.elements()[start..end]
                .iter()
                .map(|vertex| (signature(*vertex), *vertex))
                .collect::<Vec<_>>();
            keyed.sort_by(|left, right| left.0.cmp(&right.0));

            for (slot, (_, vertex)) in nest.cell_mut(start, end).iter_mut().zip(keyed.iter()) {
                *slot = *vertex;
            }
            for (offset, pair) in keyed.windows(2).enumerate() {
                if pair[0].0 != pair[1].0 {
                    nest.queue_boundary(start + offset + 1);
                }
            }
        }

        if !nest.advance_level() {
            break;
        }
        trace.push(nest.cell_count());
        debug!(level = trace.len(), cells = nest.cell_count(), "refinement round");
    }

    trace
}

impl Backend for Refiner {
    type Native = RefinementInput;
    type Output = Refinement;

    fn name(&self) -> &'static str {
        "refiner"
    }

    fn build(&self, input: &TrialInput<'_>) -> Result<RefinementInput, Error> {
        let graph = build_sparse(input)?;
        let nest = PartitionNest::from_colouring(&input.colouring()?, self.mode);

        Ok(RefinementInput { graph, nest })
    }

    fn compute(&self, mut native: RefinementInput) -> Result<Refinement, Error> {
        let trace = refine(&native.graph, &mut native.nest);

        Ok(Refinement {
            trace,
            nest: native.nest,
        })
    }
}
