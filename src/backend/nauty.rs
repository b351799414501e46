use custom_debug_derive::Debug;
use nauty_Traces_sys::{
    densenauty, optionblk, sparsegraph, sparsenauty, statsblk, SparseGraph, TracesOptions,
    TracesStats, FALSE, TRUE,
};
use std::os::raw::c_int;

use super::{Backend, CanonOptions};
use crate::{
    graph::{NautyGraph, SparseNautyGraph, TracesGraph, TrialInput, VertexIndex},
    Error,
};

/// Canonical graph as returned by the backend.
#[derive(Debug)]
pub enum CanonicalGraph {
    Dense { words: Vec<u64>, m: usize },
    Sparse(SparseGraph),
}

/// Everything nauty or Traces report back, passed on unchanged.
#[derive(Debug)]
pub struct CanonOutput {
    /// lab after the call, the canonical labelling if requested.
    pub labelling: Vec<VertexIndex>,
    pub orbits: Vec<VertexIndex>,
    pub group_size: f64,
    pub generators: usize,
    pub orbit_count: usize,
    #[debug(skip)]
    pub canonical_graph: Option<CanonicalGraph>,
}

impl CanonicalGraph {
    /// All arcs in lexicographic order. Sparse canonical graphs
    /// don't have sorted neighbourhoods, so this is the way to compare them.
    pub fn arcs(&self) -> Vec<(VertexIndex, VertexIndex)> {
        let mut arcs = Vec::new();
        match self {
            Self::Dense { words, m } => {
                for (index, word) in words.iter().enumerate() {
                    let start = (index / m) as VertexIndex;
                    let offset = (index % m) * 64;
                    for bit in 0..64 {
                        if word & (1u64 << (63 - bit)) != 0 {
                            arcs.push((start, (offset + bit) as VertexIndex));
                        }
                    }
                }
            }
            Self::Sparse(sparse_graph) => {
                for (start, (offset, degree)) in
                    sparse_graph.v.iter().zip(sparse_graph.d.iter()).enumerate()
                {
                    let offset = *offset as usize;
                    for end in &sparse_graph.e[offset..offset + *degree as usize] {
                        arcs.push((start as VertexIndex, *end));
                    }
                }
            }
        }
        arcs.sort_unstable();
        arcs
    }
}

fn check_status(backend: &'static str, status: c_int) -> Result<(), Error> {
    if status == 0 {
        Ok(())
    } else {
        Err(Error::Backend {
            backend,
            status: status as i32,
        })
    }
}

/// nauty reports the group size as `grpsize1 * 10^grpsize2`.
fn group_size(grpsize1: f64, grpsize2: c_int) -> f64 {
    grpsize1 * 10f64.powi(grpsize2 as i32)
}

/// Dense nauty on the bit matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseNauty {
    pub options: CanonOptions,
}

/// Sparse nauty on the compressed rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseNauty {
    pub options: CanonOptions,
}

/// Traces on the compressed rows. Only defined for undirected graphs,
/// digraphs are symmetrized while building.
#[derive(Debug, Clone, Copy, Default)]
pub struct Traces {
    pub options: CanonOptions,
}

fn nauty_options(mut options: optionblk, canon_options: &CanonOptions) -> optionblk {
    options.getcanon = if canon_options.get_canon { TRUE } else { FALSE };
    options.digraph = if canon_options.digraph { TRUE } else { FALSE };
    options.defaultptn = FALSE;
    options.writeautoms = FALSE;
    options
}

/// Room for the canonical sparse graph, big enough so that
/// nauty never has to reallocate it.
fn sparse_canon(traces_graph: &TracesGraph, get_canon: bool) -> Option<SparseGraph> {
    if get_canon {
        Some(SparseGraph::new(
            traces_graph.size(),
            traces_graph.number_edges(),
        ))
    } else {
        None
    }
}

impl Backend for DenseNauty {
    type Native = NautyGraph;
    type Output = CanonOutput;

    fn name(&self) -> &'static str {
        "nauty (dense)"
    }

    fn build(&self, input: &TrialInput<'_>) -> Result<NautyGraph, Error> {
        let nauty_graph = NautyGraph::from_input(input)?;
        debug_assert!(nauty_graph.check_valid());
        Ok(nauty_graph)
    }

    fn compute(&self, mut nauty_graph: NautyGraph) -> Result<CanonOutput, Error> {
        let (n, m) = nauty_graph.dense_graph.graph_repr_sizes();
        let get_canon = self.options.get_canon;

        let mut options = nauty_options(optionblk::default(), &self.options);
        let mut stats = statsblk::default();
        let mut orbits = vec![0 as c_int; n];
        let mut canon = if get_canon {
            vec![0u64; n * m]
        } else {
            Vec::new()
        };
        let canon_ptr = if get_canon {
            canon.as_mut_ptr()
        } else {
            std::ptr::null_mut()
        };

        // Safety: lab, ptn and orbits hold n entries,
        // the graph and canon n * m setwords.
        unsafe {
            densenauty(
                nauty_graph.dense_graph.adjacency_matrix.as_mut_ptr(),
                nauty_graph.vertex_order.as_mut_ptr(),
                nauty_graph.partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                m as c_int,
                n as c_int,
                canon_ptr,
            );
        }
        check_status(self.name(), stats.errstatus)?;

        Ok(CanonOutput {
            labelling: nauty_graph.vertex_order,
            orbits,
            group_size: group_size(stats.grpsize1, stats.grpsize2),
            generators: stats.numgenerators as usize,
            orbit_count: stats.numorbits as usize,
            canonical_graph: if get_canon {
                Some(CanonicalGraph::Dense { words: canon, m })
            } else {
                None
            },
        })
    }
}

impl Backend for SparseNauty {
    type Native = SparseNautyGraph;
    type Output = CanonOutput;

    fn name(&self) -> &'static str {
        "nauty (sparse)"
    }

    fn build(&self, input: &TrialInput<'_>) -> Result<SparseNautyGraph, Error> {
        SparseNautyGraph::from_input(input)
    }

    fn compute(&self, mut sparse_nauty_graph: SparseNautyGraph) -> Result<CanonOutput, Error> {
        let n = sparse_nauty_graph.size();

        let mut options = nauty_options(optionblk::default_sparse(), &self.options);
        let mut stats = statsblk::default();
        let mut orbits = vec![0 as c_int; n];
        let mut canon = sparse_canon(&sparse_nauty_graph, self.options.get_canon);
        let mut canon_sg: Option<sparsegraph> = canon.as_mut().map(|canon| canon.into());
        let canon_ptr = canon_sg
            .as_mut()
            .map_or(std::ptr::null_mut(), |sg| sg as *mut sparsegraph);

        // Safety: lab, ptn and orbits hold n entries, canon_sg points
        // into canon which is big enough for the canonical graph.
        unsafe {
            sparsenauty(
                &mut (&mut sparse_nauty_graph.sparse_graph).into(),
                sparse_nauty_graph.vertex_order.as_mut_ptr(),
                sparse_nauty_graph.partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                canon_ptr,
            );
        }
        check_status(self.name(), stats.errstatus)?;

        Ok(CanonOutput {
            labelling: sparse_nauty_graph.vertex_order,
            orbits,
            group_size: group_size(stats.grpsize1, stats.grpsize2),
            generators: stats.numgenerators as usize,
            orbit_count: stats.numorbits as usize,
            canonical_graph: canon.map(CanonicalGraph::Sparse),
        })
    }
}

impl Backend for Traces {
    type Native = TracesGraph;
    type Output = CanonOutput;

    fn name(&self) -> &'static str {
        "Traces"
    }

    fn build(&self, input: &TrialInput<'_>) -> Result<TracesGraph, Error> {
        if self.options.digraph {
            tracing::debug!("symmetrizing digraph for Traces");
            let undirected = input.undirected()?;
            return TracesGraph::from_input(&input.with_adjacency(&undirected));
        }
        TracesGraph::from_input(input)
    }

    fn compute(&self, mut traces_graph: TracesGraph) -> Result<CanonOutput, Error> {
        let n = traces_graph.size();

        let mut options = TracesOptions {
            getcanon: if self.options.get_canon { TRUE } else { FALSE },
            ..Default::default()
        };
        options.defaultptn = FALSE;
        options.digraph = FALSE;
        let mut stats = TracesStats::default();
        let mut orbits = vec![0 as c_int; n];
        let mut canon = sparse_canon(&traces_graph, self.options.get_canon);
        let mut canon_sg: Option<sparsegraph> = canon.as_mut().map(|canon| canon.into());
        let canon_ptr = canon_sg
            .as_mut()
            .map_or(std::ptr::null_mut(), |sg| sg as *mut sparsegraph);

        // Safety: lab, ptn and orbits hold n entries, canon_sg points
        // into canon which is big enough for the canonical graph.
        unsafe {
            nauty_Traces_sys::Traces(
                &mut (&mut traces_graph.sparse_graph).into(),
                traces_graph.vertex_order.as_mut_ptr(),
                traces_graph.partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                canon_ptr,
            );
        }
        check_status(self.name(), stats.errstatus)?;

        Ok(CanonOutput {
            labelling: traces_graph.vertex_order,
            orbits,
            group_size: group_size(stats.grpsize1, stats.grpsize2),
            generators: stats.numgenerators as usize,
            orbit_count: stats.numorbits as usize,
            canonical_graph: canon.map(CanonicalGraph::Sparse),
        })
    }
}
