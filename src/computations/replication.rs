use crate::{Diff, ProcId, VertexId};

use timely::dataflow::Scope;
use differential_dataflow::Collection;
use differential_dataflow::lattice::Lattice;
use differential_dataflow::operators::reduce::{Count, Threshold};

// Histogram of replication: for each replica count k, the number of vertices present on
// exactly k processes. Input holds one `(vertex, process)` fact per local directory entry.
pub fn replication<G>(replicas: &Collection<G, (VertexId, ProcId)>) -> Collection<G, (Diff, Diff)>
where
    G: Scope,
    G::Timestamp: Lattice+Ord,
{
    replicas
        .distinct()
        .map(|(vertex, _proc)| vertex)
        .count()
        .map(|(_vertex, copies)| copies)
        .count()
}
