//! Final handoff of placed records into local graph storage. Used alone, edges are placed
//! by a hash of both endpoints and vertices by a hash of their id.

use log::{debug, info, warn};
use timely::communication::Allocate;
use timely::worker::Worker;
use timely::ExchangeData;

use crate::exchange::{AllReduce, ExchangeChannel};
use crate::ingress::{EdgeRecord, Ingress, VertexRecord};
use crate::{hash_edge, owning_proc, Error, LocalGraph, LocalVertexId, ProcId, VertexId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseReport {
    pub edges_added: usize,
    pub vertices_added: usize,
    pub mirrors_announced: usize,
    /// Master entries created only because a mirror announced them.
    pub masters_created: usize,
}

pub struct IngressBase<V: ExchangeData, E: ExchangeData> {
    index: ProcId,
    peers: usize,
    edge_exchange: ExchangeChannel<EdgeRecord<E>>,
    vertex_exchange: ExchangeChannel<VertexRecord<V>>,
    mirror_exchange: ExchangeChannel<(VertexId, ProcId)>,
    reduce: AllReduce,
    graph: LocalGraph<V, E>,
}

impl<V: ExchangeData, E: ExchangeData> IngressBase<V, E> {
    pub fn new<A: Allocate>(worker: &mut Worker<A>) -> Self {
        let index = worker.index();
        IngressBase {
            index,
            peers: worker.peers(),
            edge_exchange: ExchangeChannel::new(worker),
            vertex_exchange: ExchangeChannel::new(worker),
            mirror_exchange: ExchangeChannel::new(worker),
            reduce: AllReduce::new(worker),
            graph: LocalGraph::new(index),
        }
    }

    pub fn send_edge(&mut self, dest: ProcId, record: EdgeRecord<E>) {
        self.edge_exchange.send(dest, record);
    }

    pub fn send_vertex(&mut self, dest: ProcId, record: VertexRecord<V>) {
        self.vertex_exchange.send(dest, record);
    }

    pub fn graph_mut(&mut self) -> &mut LocalGraph<V, E> {
        &mut self.graph
    }

    fn receive_edges(&mut self, report: &mut BaseReport) -> Result<(), Error> {
        let peers = self.peers;
        while let Some(batch) = self.edge_exchange.recv() {
            for rec in batch {
                let source = self.graph.insert_vertex(rec.source, owning_proc(rec.source, peers))?;
                let target = self.graph.insert_vertex(rec.target, owning_proc(rec.target, peers))?;
                self.graph.add_edge(source, target, rec.data);
                report.edges_added += 1;
            }
        }
        self.edge_exchange.clear();
        Ok(())
    }

    fn receive_vertices(&mut self, report: &mut BaseReport) -> Result<(), Error> {
        while let Some(batch) = self.vertex_exchange.recv() {
            for rec in batch {
                let lvid = self.graph.insert_vertex(rec.id, self.index)?;
                if self.graph.set_vertex_data(lvid, rec.data).is_some() {
                    warn!("worker {}: vertex {} received data more than once, keeping the last", self.index, rec.id);
                }
                report.vertices_added += 1;
            }
        }
        self.vertex_exchange.clear();
        Ok(())
    }

    // Every replica created in this pass tells its owner about itself, so each vertex ends
    // up with exactly one master entry cluster-wide.
    fn negotiate_mirrors<A: Allocate>(&mut self, worker: &mut Worker<A>, first_new: usize, report: &mut BaseReport) -> Result<(), Error> {
        for lvid in first_new .. self.graph.num_vertices() {
            let record = self.graph.record(lvid as LocalVertexId);
            let (gvid, owner) = (record.gvid, record.owner);
            if owner != self.index {
                self.mirror_exchange.send(owner, (gvid, self.index));
                report.mirrors_announced += 1;
            }
        }
        self.mirror_exchange.flush(worker);

        while let Some(batch) = self.mirror_exchange.recv() {
            for (gvid, mirror) in batch {
                if self.graph.lvid(gvid).is_none() {
                    report.masters_created += 1;
                }
                let lvid = self.graph.insert_vertex(gvid, self.index)?;
                let entry = self.graph.record_mut(lvid);
                if entry.owner != self.index {
                    warn!("worker {}: mirror of vertex {} announced here, but owner is {}", self.index, gvid, entry.owner);
                }
                entry.mirrors.insert(mirror);
            }
        }
        self.mirror_exchange.clear();
        Ok(())
    }
}

impl<V: ExchangeData, E: ExchangeData> Ingress<V, E> for IngressBase<V, E> {
    type Report = BaseReport;

    fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) {
        let dest = (hash_edge(source, target) % self.peers as u64) as ProcId;
        self.send_edge(dest, EdgeRecord { source, target, data });
    }

    fn add_vertex(&mut self, id: VertexId, data: V) {
        let dest = owning_proc(id, self.peers);
        self.send_vertex(dest, VertexRecord { id, data });
    }

    fn finalize<A: Allocate>(&mut self, worker: &mut Worker<A>) -> Result<Option<BaseReport>, Error> {
        self.edge_exchange.flush(worker);
        self.vertex_exchange.flush(worker);

        let local = self.edge_exchange.size() + self.vertex_exchange.size();
        if self.reduce.sum(worker, local as u64) == 0 {
            info!("worker {}: skipping graph finalization because no changes happened", self.index);
            return Ok(None);
        }

        let mut report = BaseReport::default();
        let first_new = self.graph.num_vertices();
        self.receive_edges(&mut report)?;
        self.receive_vertices(&mut report)?;
        debug!("worker {}: {} edges and {} vertex records added", self.index, report.edges_added, report.vertices_added);

        self.negotiate_mirrors(worker, first_new, &mut report)?;

        info!(
            "worker {}: local graph has {} vertices ({} mastered) and {} edges",
            self.index,
            self.graph.num_vertices(),
            self.graph.num_masters(),
            self.graph.num_edges(),
        );
        Ok(Some(report))
    }

    fn graph(&self) -> &LocalGraph<V, E> {
        &self.graph
    }

    fn into_graph(self) -> LocalGraph<V, E> {
        self.graph
    }
}
