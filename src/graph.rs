use std::collections::{BTreeSet, HashMap};

use crate::{Error, LocalVertexId, ProcId, VertexId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub gvid: VertexId,
    pub owner: ProcId,
    // only populated on the owner
    pub mirrors: BTreeSet<ProcId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalEdge<E> {
    pub source: LocalVertexId,
    pub target: LocalVertexId,
    pub data: E,
}

#[derive(Debug, Clone)]
pub struct LocalGraph<V, E> {
    index: ProcId,
    lvid2record: Vec<DirectoryEntry>,
    vid2lvid: HashMap<VertexId, LocalVertexId>,
    vertex_data: Vec<Option<V>>,
    edges: Vec<LocalEdge<E>>,
}

impl<V, E> LocalGraph<V, E> {
    pub fn new(index: ProcId) -> Self {
        LocalGraph {
            index,
            lvid2record: Vec::new(),
            vid2lvid: HashMap::new(),
            vertex_data: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.lvid2record.reserve(additional);
        self.vertex_data.reserve(additional);
        self.vid2lvid.reserve(additional);
    }

    /// Returns the local id of `gvid`, creating an entry owned by `owner` if absent.
    /// Local ids are dense and never reassigned.
    pub fn insert_vertex(&mut self, gvid: VertexId, owner: ProcId) -> Result<LocalVertexId, Error> {
        if let Some(&lvid) = self.vid2lvid.get(&gvid) {
            return Ok(lvid);
        }
        let lvid = next_lvid(self.lvid2record.len())?;
        self.lvid2record.push(DirectoryEntry { gvid, owner, mirrors: BTreeSet::new() });
        self.vertex_data.push(None);
        self.vid2lvid.insert(gvid, lvid);
        Ok(lvid)
    }

    pub fn lvid(&self, gvid: VertexId) -> Option<LocalVertexId> {
        self.vid2lvid.get(&gvid).copied()
    }

    pub fn gvid(&self, lvid: LocalVertexId) -> VertexId {
        self.lvid2record[lvid as usize].gvid
    }

    pub fn record(&self, lvid: LocalVertexId) -> &DirectoryEntry {
        &self.lvid2record[lvid as usize]
    }

    pub fn record_mut(&mut self, lvid: LocalVertexId) -> &mut DirectoryEntry {
        &mut self.lvid2record[lvid as usize]
    }

    pub fn records(&self) -> &[DirectoryEntry] {
        &self.lvid2record
    }

    pub fn add_edge(&mut self, source: LocalVertexId, target: LocalVertexId, data: E) {
        self.edges.push(LocalEdge { source, target, data });
    }

    pub fn edges(&self) -> &[LocalEdge<E>] {
        &self.edges
    }

    pub fn set_vertex_data(&mut self, lvid: LocalVertexId, data: V) -> Option<V> {
        self.vertex_data[lvid as usize].replace(data)
    }

    pub fn vertex_data(&self, lvid: LocalVertexId) -> Option<&V> {
        self.vertex_data[lvid as usize].as_ref()
    }

    pub fn num_vertices(&self) -> usize {
        self.lvid2record.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn masters(&self) -> impl Iterator<Item = VertexId> + '_ {
        let index = self.index;
        self.lvid2record.iter().filter(move |rec| rec.owner == index).map(|rec| rec.gvid)
    }

    pub fn num_masters(&self) -> usize {
        self.masters().count()
    }
}

fn next_lvid(len: usize) -> Result<LocalVertexId, Error> {
    LocalVertexId::try_from(len).map_err(|_| Error::LocalIdsExhausted(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ids_are_dense_and_stable() {
        let mut graph = LocalGraph::<(), ()>::new(1);
        assert_eq!(graph.insert_vertex(40, 1), Ok(0));
        assert_eq!(graph.insert_vertex(7, 0), Ok(1));
        assert_eq!(graph.insert_vertex(40, 0), Ok(0));
        assert_eq!(graph.num_vertices(), 2);
        assert_eq!(graph.lvid(7), Some(1));
        assert_eq!(graph.gvid(1), 7);
        assert_eq!(graph.record(0).owner, 1);
        assert_eq!(graph.masters().collect::<Vec<_>>(), vec![40]);
    }

    #[test]
    fn edges_and_data() {
        let mut graph = LocalGraph::<&str, u8>::new(0);
        let a = graph.insert_vertex(1, 0).unwrap();
        let b = graph.insert_vertex(2, 0).unwrap();
        graph.add_edge(a, b, 9);
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.edges()[0], LocalEdge { source: 0, target: 1, data: 9 });
        assert_eq!(graph.set_vertex_data(a, "a"), None);
        assert_eq!(graph.set_vertex_data(a, "b"), Some("a"));
        assert_eq!(graph.vertex_data(a), Some(&"b"));
        assert_eq!(graph.vertex_data(b), None);
    }

    #[test]
    fn local_ids_do_not_wrap() {
        let last = LocalVertexId::MAX as usize;
        assert_eq!(next_lvid(last), Ok(LocalVertexId::MAX));
        assert_eq!(next_lvid(last + 1), Err(Error::LocalIdsExhausted(last + 1)));
    }
}
