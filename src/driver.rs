//! Plumbing shared by the partitioning binaries.

use log::{info, warn};
use timely::communication::Allocate;
use timely::dataflow::operators::map::Map;
use timely::dataflow::operators::to_stream::ToStream;
use timely::worker::Worker;
use differential_dataflow::collection::AsCollection;
use differential_dataflow::operators::consolidate::Consolidate;

use crate::computations::balance::balance;
use crate::computations::replication::replication;
use crate::{BipartiteIngress, Diff, Edge, Ingress, IngressBase, IngressConfig, IngressKind};
use crate::{Error, LocalGraph, ProcId, Time, VertexId};

/// Places this worker's share of `edges` with the chosen ingress and returns its local graph.
pub fn partition<A: Allocate>(
    worker: &mut Worker<A>,
    kind: IngressKind,
    config: IngressConfig,
    edges: Vec<Edge<VertexId>>,
) -> Result<LocalGraph<(), ()>, Error> {
    info!("worker {}: partitioning {} edges with {:?} ingress", worker.index(), edges.len(), kind);
    match kind {
        IngressKind::Bipartite => {
            let ingress = BipartiteIngress::new(worker, config);
            place(worker, ingress, edges)
        }
        IngressKind::Hash => {
            let ingress = IngressBase::new(worker);
            place(worker, ingress, edges)
        }
    }
}

fn place<A: Allocate, I: Ingress<(), ()>>(worker: &mut Worker<A>, mut ingress: I, edges: Vec<Edge<VertexId>>) -> Result<LocalGraph<(), ()>, Error> {
    for (source, target) in edges {
        ingress.add_edge(source, target, ());
    }
    if ingress.finalize(worker)?.is_none() {
        warn!("worker {}: no edges anywhere in the cluster", worker.index());
    }
    Ok(ingress.into_graph())
}

/// Prints the replication histogram and per-process edge counts of a partitioned graph.
///
/// Runs the worker until all dataflows complete, so every ingress must be dropped first.
pub fn report_quality<A: Allocate>(worker: &mut Worker<A>, graph: &LocalGraph<(), ()>) {
    let index: ProcId = worker.index();
    let timer = worker.timer();

    let replicas: Vec<(VertexId, ProcId)> = graph.records().iter().map(|rec| (rec.gvid, index)).collect();
    let edges = graph.num_edges() as Diff;

    worker.dataflow::<Time, _, _>(|scope| {

        let replicas = replicas.to_stream(scope).map(|fact| (fact, 0, 1)).as_collection();
        let edges = Some((index, 0, edges)).to_stream(scope).as_collection();

        replication(&replicas)
            .consolidate()
            .inspect(move |((copies, vertices), _, _)| println!("{:?}\t{} vertices with {} replicas", timer.elapsed(), vertices, copies));

        balance(&edges)
            .inspect(move |((proc, count), _, _)| println!("{:?}\tworker {} holds {} edges", timer.elapsed(), proc, count));
    });

    while worker.step() { }
}
