//! Caller side graph input as well as the
//! builders that expand it into the
//! representations understood by nauty and Traces.
use itertools::Either;
use std::{convert::TryFrom, os::raw::c_int};

mod dense;
pub use dense::DenseGraph;

mod sparse;
pub use sparse::build_sparse;

mod nauty_traces_graph;
pub use nauty_traces_graph::{NautyGraph, SparseNautyGraph, TracesGraph};

use crate::{
    colouring::{BlockMarker, Colouring},
    debug::MalformedInput,
};

pub type VertexIndex = c_int;

/// The two accepted shapes of arcs. Both describe a directed graph,
/// an undirected edge has to be given as two arcs.
#[derive(Debug, Clone, Copy)]
pub enum EdgeList<'a> {
    /// `[s0, t0, s1, t1, ...]`
    FlatArcs(&'a [VertexIndex]),
    /// One list of out-neighbours per vertex.
    Adjacency(&'a [Vec<VertexIndex>]),
}

impl<'a> EdgeList<'a> {
    pub fn arc_count(&self) -> usize {
        match self {
            Self::FlatArcs(flat) => flat.len() / 2,
            Self::Adjacency(adjacency) => adjacency.iter().map(Vec::len).sum(),
        }
    }

    pub fn arcs(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex)> + 'a {
        match *self {
            Self::FlatArcs(flat) => Either::Left(flat.chunks_exact(2).map(|arc| (arc[0], arc[1]))),
            Self::Adjacency(adjacency) => Either::Right(
                adjacency.iter().enumerate().flat_map(|(start, ends)| {
                    ends.iter().map(move |end| (start as VertexIndex, *end))
                }),
            ),
        }
    }

    /// Only checks what is needed to not write outside of
    /// the native structures: arc endpoints within `[0, n)`.
    pub fn check(&self, n: usize) -> Result<(), MalformedInput> {
        if let Self::FlatArcs(flat) = self {
            if flat.len() % 2 != 0 {
                return Err(MalformedInput::OddArcList(flat.len()));
            }
        }

        let in_range = |vertex: VertexIndex| usize::try_from(vertex).map_or(false, |v| v < n);
        match self.arcs().find(|(start, end)| !in_range(*start) || !in_range(*end)) {
            Some((start, end)) => Err(MalformedInput::ArcOutOfRange(start as i64, end as i64)),
            None => Ok(()),
        }
    }
}

/// Input of a single trial.
#[derive(Debug, Clone, Copy)]
pub struct TrialInput<'a> {
    vertex_count: usize,
    edges: EdgeList<'a>,
    colouring: Option<&'a [VertexIndex]>,
    marker: BlockMarker,
}

impl<'a> TrialInput<'a> {
    /// The number of vertices is the number of adjacency lists.
    pub fn from_adjacency(
        adjacency: &'a [Vec<VertexIndex>],
        colouring: Option<&'a [VertexIndex]>,
    ) -> Self {
        TrialInput {
            vertex_count: adjacency.len(),
            edges: EdgeList::Adjacency(adjacency),
            colouring,
            marker: BlockMarker::First,
        }
    }

    pub fn from_arcs(
        vertex_count: usize,
        arcs: &'a [VertexIndex],
        colouring: Option<&'a [VertexIndex]>,
    ) -> Self {
        TrialInput {
            vertex_count,
            edges: EdgeList::FlatArcs(arcs),
            colouring,
            marker: BlockMarker::First,
        }
    }

    /// Read the colouring with the given block marker.
    pub fn with_marker(self, marker: BlockMarker) -> Self {
        TrialInput { marker, ..self }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edges(&self) -> EdgeList<'a> {
        self.edges
    }

    /// Check size and arcs of the input.
    pub fn check(&self) -> Result<(), MalformedInput> {
        if self.vertex_count == 0 {
            return Err(MalformedInput::EmptyGraph);
        }
        self.edges.check(self.vertex_count)
    }

    /// Every arc of the input in both directions, as adjacency lists.
    pub fn undirected(&self) -> Result<Vec<Vec<VertexIndex>>, MalformedInput> {
        self.check()?;

        let mut adjacency = vec![Vec::new(); self.vertex_count];
        for (start, end) in self.edges.arcs() {
            adjacency[start as usize].push(end);
        }
        symmetrized(&adjacency)
    }

    /// The same vertices and colouring over other arcs.
    pub fn with_adjacency<'b>(&self, adjacency: &'b [Vec<VertexIndex>]) -> TrialInput<'b>
    where
        'a: 'b,
    {
        TrialInput {
            vertex_count: adjacency.len(),
            edges: EdgeList::Adjacency(adjacency),
            colouring: self.colouring,
            marker: self.marker,
        }
    }

    /// Decode the colouring, a missing one means a single block.
    pub fn colouring(&self) -> Result<Colouring<'a>, MalformedInput> {
        match self.colouring {
            Some(raw) => Colouring::parse_with(raw, self.vertex_count, self.marker),
            None => Colouring::unit(self.vertex_count),
        }
    }
}

/// Add the reverse of every arc. Graphs for Traces must be undirected,
/// i.e. every edge is present in both directions.
pub fn symmetrized(adjacency: &[Vec<VertexIndex>]) -> Result<Vec<Vec<VertexIndex>>, MalformedInput> {
    let n = adjacency.len();
    EdgeList::Adjacency(adjacency).check(n)?;

    let mut in_degree = vec![0usize; n];
    for end in adjacency.iter().flatten() {
        in_degree[*end as usize] += 1;
    }

    let mut undirected = adjacency
        .iter()
        .zip(in_degree)
        .map(|(ends, reverse)| {
            let mut neighbours = Vec::with_capacity(ends.len() + reverse);
            neighbours.extend_from_slice(ends);
            neighbours
        })
        .collect::<Vec<_>>();

    for (start, ends) in adjacency.iter().enumerate() {
        for end in ends {
            undirected[*end as usize].push(start as VertexIndex);
        }
    }

    // Remove the doubles of arcs that were already present in both directions.
    for neighbours in undirected.iter_mut() {
        neighbours.sort_unstable();
        neighbours.dedup();
    }

    Ok(undirected)
}
