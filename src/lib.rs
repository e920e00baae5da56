pub type VertexId = u64;
pub type LocalVertexId = u32;
pub type ProcId = usize;
pub type Edge<N> = (N,N);
pub type Time = u64;
pub type Diff = isize;

pub mod computations;
pub mod config;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod graph;
pub mod ingress;

pub use config::{IngressConfig, IngressKind, SpecialSide, VoteWeighting};
pub use error::Error;
pub use graph::LocalGraph;
pub use crate::ingress::{Ingress, IngressBase, BipartiteIngress, FinalizeReport};

use xxhash_rust::xxh3::xxh3_64;

/// Cluster-wide vertex hash. Every process computes the same value for the same id.
pub fn hash_vertex(vid: VertexId) -> u64 {
    xxh3_64(&vid.to_le_bytes())
}

/// Hash of an ordered edge, used only for plain hash placement of edges.
pub fn hash_edge(source: VertexId, target: VertexId) -> u64 {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&source.to_le_bytes());
    bytes[8..].copy_from_slice(&target.to_le_bytes());
    xxh3_64(&bytes)
}

/// The process that would own `vid` under pure hash placement.
pub fn owning_proc(vid: VertexId, peers: usize) -> ProcId {
    (hash_vertex(vid) % peers as u64) as ProcId
}

pub fn load_graph(filename: &str, index: usize, peers: usize) -> Vec<Edge<VertexId>> {
    let mut results = Vec::new();
    use graph_map::GraphMMap;
    let graph = GraphMMap::new(&filename);
    for node in 0 .. graph.nodes() {
        if node % peers == index {
            for &edge in graph.edges(node) {
                results.push((node as VertexId, edge as VertexId));
            }
        }
    }
    results
}
