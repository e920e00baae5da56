use crate::{Diff, ProcId};

use timely::dataflow::Scope;
use differential_dataflow::Collection;
use differential_dataflow::lattice::Lattice;
use differential_dataflow::operators::reduce::Count;

// Number of edges held by each process. The input multiplicity of a process is its
// local edge count.
pub fn balance<G>(edges: &Collection<G, ProcId>) -> Collection<G, (ProcId, Diff)>
where
    G: Scope,
    G::Timestamp: Lattice+Ord,
{
    edges.count()
}
