use custom_debug_derive::Debug;
use nauty_Traces_sys::SparseGraph;

use super::{build_sparse, DenseGraph, TrialInput, VertexIndex};
use crate::Error;

/// Input for dense nauty: the bit matrix and the colouring as `lab`/`ptn`.
#[derive(Debug)]
pub struct NautyGraph {
    /// actual graph
    pub dense_graph: DenseGraph,
    /// lab
    pub vertex_order: Vec<VertexIndex>,
    /// ptn aka the colouring
    pub partition: Vec<VertexIndex>,
}

/// Input for sparse nauty and Traces.
#[derive(Debug)]
pub struct TracesGraph {
    /// actual graph
    #[debug(skip)]
    pub sparse_graph: SparseGraph,
    /// lab
    pub vertex_order: Vec<VertexIndex>,
    /// ptn aka the colouring
    pub partition: Vec<VertexIndex>,
}

pub type SparseNautyGraph = TracesGraph;

impl NautyGraph {
    pub fn from_input(input: &TrialInput<'_>) -> Result<NautyGraph, Error> {
        let dense_graph = DenseGraph::build(input)?;
        let label_partition = input.colouring()?.label_partition();

        Ok(NautyGraph {
            dense_graph,
            partition: label_partition.nauty_ptn(),
            vertex_order: label_partition.labels,
        })
    }

    pub fn check_valid(&self) -> bool {
        let (n, _) = self.dense_graph.graph_repr_sizes();
        self.dense_graph.check_valid() && self.vertex_order.len() == n && self.partition.len() == n
    }
}

impl TracesGraph {
    pub fn from_input(input: &TrialInput<'_>) -> Result<TracesGraph, Error> {
        let sparse_graph = build_sparse(input)?;
        let label_partition = input.colouring()?.label_partition();

        Ok(TracesGraph {
            sparse_graph,
            partition: label_partition.nauty_ptn(),
            vertex_order: label_partition.labels,
        })
    }

    pub fn size(&self) -> usize {
        self.vertex_order.len()
    }

    pub fn number_edges(&self) -> usize {
        self.sparse_graph.e.len()
    }
}
