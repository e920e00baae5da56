use serde::{Deserialize, Serialize};
use timely::communication::Allocate;
use timely::worker::Worker;

use crate::{Error, LocalGraph, VertexId};

pub mod base;
pub mod bipartite;
pub mod tables;

pub use base::{BaseReport, IngressBase};
pub use bipartite::{BipartiteIngress, FinalizeReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord<E> {
    pub source: VertexId,
    pub target: VertexId,
    pub data: E,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord<V> {
    pub id: VertexId,
    pub data: V,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDegreeMessage<E> {
    pub edge: EdgeRecord<E>,
    pub common_degree: u64,
}

pub trait Ingress<V, E> {
    type Report;

    fn add_edge(&mut self, source: VertexId, target: VertexId, data: E);

    fn add_vertex(&mut self, id: VertexId, data: V);

    /// Places everything added since the last call. Every worker must call it; `None`
    /// when no worker had anything to place.
    fn finalize<A: Allocate>(&mut self, worker: &mut Worker<A>) -> Result<Option<Self::Report>, Error>;

    fn graph(&self) -> &LocalGraph<V, E>;

    fn into_graph(self) -> LocalGraph<V, E>;
}
