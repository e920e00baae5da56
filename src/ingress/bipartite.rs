//! Locality-aware ingress for bipartite-like graphs. Edges are counted at their common
//! endpoint, voted on at their special endpoint, and finally placed with the special
//! vertex's owner.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::{debug, info, warn};
use timely::communication::Allocate;
use timely::worker::Worker;
use timely::ExchangeData;

use crate::exchange::{AllReduce, ExchangeChannel};
use crate::ingress::base::{BaseReport, IngressBase};
use crate::ingress::tables::{DegreeTable, OwnershipResolver};
use crate::ingress::{EdgeDegreeMessage, EdgeRecord, Ingress, VertexRecord};
use crate::{owning_proc, Error, IngressConfig, LocalGraph, ProcId, SpecialSide, VertexId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collect,
    AggregateDegree,
    ResolveOwnership,
    Redistribute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Collect => "collect",
            Phase::AggregateDegree => "aggregate-degree",
            Phase::ResolveOwnership => "resolve-ownership",
            Phase::Redistribute => "redistribute",
        };
        f.write_str(name)
    }
}

/// What one worker did during a finalize pass.
#[derive(Debug, Clone, Default)]
pub struct FinalizeReport {
    pub edges_collected: usize,
    pub common_vertices: usize,
    pub degree_total: u64,
    /// Degree of each common vertex counted here during this pass.
    pub degrees: HashMap<VertexId, u64>,
    pub special_vertices: usize,
    pub vote_total: f64,
    /// Per-process vote totals of each special vertex resolved here during this pass.
    pub votes: HashMap<VertexId, Vec<f64>>,
    pub owners: HashMap<VertexId, ProcId>,
    /// Vertices mastered here, in ascending id order.
    pub masters: Vec<VertexId>,
    pub edges_placed: usize,
    pub vertices_forwarded: usize,
    pub base: BaseReport,
}

struct FinalizePass<E> {
    edges: Vec<EdgeRecord<E>>,
    degrees: DegreeTable,
    resolver: OwnershipResolver,
    masters: BTreeSet<VertexId>,
}

pub struct BipartiteIngress<V: ExchangeData, E: ExchangeData> {
    config: IngressConfig,
    index: ProcId,
    peers: usize,
    vertex_exchange: ExchangeChannel<VertexRecord<V>>,
    edge_exchange: ExchangeChannel<EdgeRecord<E>>,
    msg_exchange: ExchangeChannel<EdgeDegreeMessage<E>>,
    reduce: AllReduce,
    // Owners of special vertices resolved here in earlier passes.
    owners: HashMap<VertexId, ProcId>,
    base: IngressBase<V, E>,
}

impl<V: ExchangeData, E: ExchangeData> BipartiteIngress<V, E> {
    pub fn new<A: Allocate>(worker: &mut Worker<A>, config: IngressConfig) -> Self {
        BipartiteIngress {
            config,
            index: worker.index(),
            peers: worker.peers(),
            vertex_exchange: ExchangeChannel::new(worker),
            edge_exchange: ExchangeChannel::new(worker),
            msg_exchange: ExchangeChannel::new(worker),
            reduce: AllReduce::new(worker),
            owners: HashMap::new(),
            base: IngressBase::new(worker),
        }
    }

    fn side(&self) -> SpecialSide {
        self.config.special
    }

    fn enter(&self, phase: Phase) {
        debug!("worker {}: entering phase {}", self.index, phase);
    }

    // Round 1: count common-side degrees over edges keyed by their common endpoint.
    fn aggregate_degrees<A: Allocate>(&mut self, worker: &mut Worker<A>, pass: &mut FinalizePass<E>) {
        self.enter(Phase::AggregateDegree);
        let side = self.side();
        while let Some(batch) = self.edge_exchange.recv() {
            for rec in batch {
                pass.degrees.observe(side.common(rec.source, rec.target));
                pass.edges.push(rec);
            }
        }
        self.edge_exchange.clear();
        self.edge_exchange.barrier(worker);
        debug!(
            "worker {}: {} edges over {} common vertices",
            self.index,
            pass.edges.len(),
            pass.degrees.len(),
        );
    }

    // Round 2: re-key by special endpoint and vote on each special vertex's owner.
    fn resolve_ownership<A: Allocate>(&mut self, worker: &mut Worker<A>, pass: &mut FinalizePass<E>, report: &mut FinalizeReport) {
        self.enter(Phase::ResolveOwnership);
        let side = self.side();
        for edge in pass.edges.drain(..) {
            let (special, common) = side.split(edge.source, edge.target);
            let common_degree = pass.degrees.degree(common);
            self.msg_exchange.send(owning_proc(special, self.peers), EdgeDegreeMessage { edge, common_degree });
        }
        report.degrees = pass.degrees.take();
        self.msg_exchange.flush(worker);

        while let Some(batch) = self.msg_exchange.recv() {
            for msg in batch {
                let (special, common) = side.split(msg.edge.source, msg.edge.target);
                let neighbor = owning_proc(common, self.peers);
                pass.resolver.vote(special, neighbor, msg.common_degree);
                pass.edges.push(msg.edge);
            }
        }
        self.msg_exchange.clear();
        debug!("worker {}: resolved owners of {} special vertices", self.index, pass.resolver.len());
    }

    // Round 3: move edges to their owners, build the master directory, forward vertex data.
    fn redistribute<A: Allocate>(&mut self, worker: &mut Worker<A>, pass: &mut FinalizePass<E>, report: &mut FinalizeReport) -> Result<(), Error> {
        self.enter(Phase::Redistribute);
        let side = self.side();
        for edge in pass.edges.drain(..) {
            let special = side.special(edge.source, edge.target);
            let owner = pass.resolver.owner(special).unwrap_or(self.index);
            self.edge_exchange.send(owner, edge);
        }
        self.edge_exchange.flush(worker);

        let mut placed = Vec::new();
        while let Some(batch) = self.edge_exchange.recv() {
            for rec in batch {
                pass.masters.insert(side.special(rec.source, rec.target));
                placed.push(rec);
            }
        }
        self.edge_exchange.clear();

        let crossed = placed
            .iter()
            .filter(|rec| pass.masters.contains(&side.common(rec.source, rec.target)))
            .count();
        if crossed > 0 {
            warn!("worker {}: {} edges have a common endpoint that is also special", self.index, crossed);
        }

        report.edges_placed = placed.len();
        for rec in placed {
            self.base.send_edge(self.index, rec);
        }

        let index = self.index;
        let graph = self.base.graph_mut();
        graph.reserve(pass.masters.len());
        for &vid in pass.masters.iter() {
            let lvid = graph.insert_vertex(vid, index)?;
            graph.record_mut(lvid).owner = index;
        }

        // Data for a special vertex follows its owner, including one settled in an earlier pass.
        while let Some(batch) = self.vertex_exchange.recv() {
            for rec in batch {
                let owner = pass.resolver.owner(rec.id).unwrap_or(self.index);
                self.base.send_vertex(owner, rec);
                report.vertices_forwarded += 1;
            }
        }
        self.vertex_exchange.clear();
        Ok(())
    }
}

impl<V: ExchangeData, E: ExchangeData> Ingress<V, E> for BipartiteIngress<V, E> {
    type Report = FinalizeReport;

    fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) {
        let common = self.side().common(source, target);
        self.edge_exchange.send(owning_proc(common, self.peers), EdgeRecord { source, target, data });
    }

    fn add_vertex(&mut self, id: VertexId, data: V) {
        self.vertex_exchange.send(owning_proc(id, self.peers), VertexRecord { id, data });
    }

    fn finalize<A: Allocate>(&mut self, worker: &mut Worker<A>) -> Result<Option<FinalizeReport>, Error> {
        self.enter(Phase::Collect);
        self.edge_exchange.flush(worker);
        self.vertex_exchange.flush(worker);

        let local = self.edge_exchange.size() + self.vertex_exchange.size();
        if self.reduce.sum(worker, local as u64) == 0 {
            info!("worker {}: skipping graph finalization because no changes happened", self.index);
            return Ok(None);
        }

        let mut pass = FinalizePass {
            edges: Vec::new(),
            degrees: DegreeTable::new(),
            resolver: OwnershipResolver::with_settled(
                self.index,
                self.peers,
                self.config.weighting,
                std::mem::take(&mut self.owners),
            ),
            masters: BTreeSet::new(),
        };
        let mut report = FinalizeReport::default();

        self.aggregate_degrees(worker, &mut pass);
        report.edges_collected = pass.edges.len();
        report.common_vertices = pass.degrees.len();
        report.degree_total = pass.degrees.total();

        self.resolve_ownership(worker, &mut pass, &mut report);
        report.special_vertices = pass.resolver.len();
        report.vote_total = pass.resolver.vote_total();

        self.redistribute(worker, &mut pass, &mut report)?;

        let FinalizePass { resolver, masters, .. } = pass;
        let resolution = resolver.into_resolution();
        report.owners = resolution.owners;
        report.votes = resolution.votes;
        self.owners = resolution.settled;
        report.masters = masters.into_iter().collect();

        info!(
            "worker {}: {} special vertices resolved, {} mastered, {} edges placed ({} special side)",
            self.index,
            report.special_vertices,
            report.masters.len(),
            report.edges_placed,
            self.side(),
        );

        report.base = self.base.finalize(worker)?.unwrap_or_default();
        Ok(Some(report))
    }

    fn graph(&self) -> &LocalGraph<V, E> {
        self.base.graph()
    }

    fn into_graph(self) -> LocalGraph<V, E> {
        self.base.into_graph()
    }
}
