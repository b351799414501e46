use nauty_Traces_sys::SparseGraph;
use std::{
    alloc::Layout,
    convert::{TryFrom, TryInto},
    os::raw::c_int,
};

use super::{EdgeList, TrialInput};
use crate::{debug::MalformedInput, Error};

/// Degree of each vertex, computed before anything of
/// the sparse representation is allocated.
fn count_degrees(edges: EdgeList<'_>, n: usize) -> Vec<usize> {
    match edges {
        EdgeList::Adjacency(adjacency) => adjacency.iter().map(Vec::len).collect(),
        EdgeList::FlatArcs(_) => {
            let mut degrees = vec![0usize; n];
            for (start, _) in edges.arcs() {
                degrees[start as usize] += 1;
            }
            degrees
        }
    }
}

/// Expand the input into nauty's compressed sparse rows.
/// The runs of the vertices in `e` keep the input order of the arcs.
pub fn build_sparse(input: &TrialInput<'_>) -> Result<SparseGraph, Error> {
    input.check()?;

    let n = input.vertex_count();
    let degrees = count_degrees(input.edges(), n);

    let number_edges = degrees
        .iter()
        .try_fold(0usize, |sum, degree| sum.checked_add(*degree))
        .ok_or(MalformedInput::DegreeOverflow)?;
    // nauty stores offsets as size_t but degrees and neighbours as int.
    c_int::try_from(number_edges).map_err(|_| MalformedInput::DegreeOverflow)?;
    Layout::array::<c_int>(number_edges).map_err(|_| Error::Allocation {
        what: "sparse graph",
        requested: number_edges,
    })?;

    let mut sparse_graph = SparseGraph::new(n, number_edges);

    let mut offset = 0usize;
    for (index, degree) in degrees.iter().enumerate() {
        sparse_graph.v[index] = offset
            .try_into()
            .map_err(|_| MalformedInput::DegreeOverflow)?;
        sparse_graph.d[index] = (*degree)
            .try_into()
            .map_err(|_| MalformedInput::DegreeOverflow)?;
        offset += degree;
    }

    match input.edges() {
        EdgeList::Adjacency(adjacency) => {
            let mut edge_counter = 0usize;
            for ends in adjacency {
                sparse_graph.e[edge_counter..edge_counter + ends.len()].copy_from_slice(ends);
                edge_counter += ends.len();
            }
        }
        edges @ EdgeList::FlatArcs(_) => {
            let mut next_free = sparse_graph
                .v
                .iter()
                .map(|offset| *offset as usize)
                .collect::<Vec<_>>();
            for (start, end) in edges.arcs() {
                let slot = &mut next_free[start as usize];
                sparse_graph.e[*slot] = end;
                *slot += 1;
            }
        }
    }

    Ok(sparse_graph)
}
