//! Process-local tables built during one finalize pass.

use std::collections::HashMap;

use crate::{ProcId, VertexId, VoteWeighting};

/// Common-side degrees; every edge of a common vertex is counted on one process.
#[derive(Debug, Default)]
pub struct DegreeTable {
    counts: HashMap<VertexId, u64>,
}

impl DegreeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, common: VertexId) {
        *self.counts.entry(common).or_insert(0) += 1;
    }

    /// Degree of `common`, or zero if none of its edges landed here.
    pub fn degree(&self, common: VertexId) -> u64 {
        self.counts.get(&common).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn take(&mut self) -> HashMap<VertexId, u64> {
        std::mem::take(&mut self.counts)
    }
}

/// Greedy owner selection for special vertices.
///
/// One vote slot per process; a slot takes the lead only when it strictly exceeds the
/// leader, so the first process to reach a total keeps it. Vertices settled by an
/// earlier pass keep their owner and only collect votes.
#[derive(Debug)]
pub struct OwnershipResolver {
    index: ProcId,
    peers: usize,
    weighting: VoteWeighting,
    votes: HashMap<VertexId, Vec<f64>>,
    owners: HashMap<VertexId, ProcId>,
    settled: HashMap<VertexId, ProcId>,
}

pub struct Resolution {
    pub owners: HashMap<VertexId, ProcId>,
    pub votes: HashMap<VertexId, Vec<f64>>,
    pub settled: HashMap<VertexId, ProcId>,
}

impl OwnershipResolver {
    pub fn new(index: ProcId, peers: usize, weighting: VoteWeighting) -> Self {
        Self::with_settled(index, peers, weighting, HashMap::new())
    }

    pub fn with_settled(index: ProcId, peers: usize, weighting: VoteWeighting, settled: HashMap<VertexId, ProcId>) -> Self {
        OwnershipResolver {
            index,
            peers,
            weighting,
            votes: HashMap::new(),
            owners: HashMap::new(),
            settled,
        }
    }

    /// Records one edge of `special` whose common endpoint hashes to `neighbor`, and
    /// returns the current owner of `special`.
    pub fn vote(&mut self, special: VertexId, neighbor: ProcId, common_degree: u64) -> ProcId {
        debug_assert!(neighbor < self.peers);
        let (peers, index) = (self.peers, self.index);
        let settled = self.settled.get(&special).copied();
        let votes = self.votes.entry(special).or_insert_with(|| vec![0.0; peers]);
        let owner = self.owners.entry(special).or_insert(settled.unwrap_or(index));

        votes[neighbor] += self.weighting.weight(common_degree);
        if settled.is_none() && votes[neighbor] > votes[*owner] {
            *owner = neighbor;
        }
        *owner
    }

    /// Owner decided in this pass or an earlier one.
    pub fn owner(&self, special: VertexId) -> Option<ProcId> {
        self.owners.get(&special).or_else(|| self.settled.get(&special)).copied()
    }

    pub fn votes(&self, special: VertexId) -> Option<&[f64]> {
        self.votes.get(&special).map(|votes| &votes[..])
    }

    /// Number of special vertices voted on in this pass.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn vote_total(&self) -> f64 {
        self.votes.values().flat_map(|votes| votes.iter()).sum()
    }

    pub fn into_resolution(self) -> Resolution {
        let mut settled = self.settled;
        settled.extend(self.owners.iter().map(|(&vid, &owner)| (vid, owner)));
        Resolution { owners: self.owners, votes: self.votes, settled }
    }
}
