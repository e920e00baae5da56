//! Ingress configuration.
//!
//! The special side is fixed once when an ingress is constructed. Parsing is strict:
//! anything other than `source` or `target` is rejected.

use std::fmt;
use std::str::FromStr;

use crate::{Error, VertexId};

/// Which endpoint of every edge is the high-skew "special" vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialSide {
    Source,
    Target,
}

impl SpecialSide {
    /// Splits an edge into `(special, common)` endpoints.
    pub fn split(&self, source: VertexId, target: VertexId) -> (VertexId, VertexId) {
        match self {
            SpecialSide::Source => (source, target),
            SpecialSide::Target => (target, source),
        }
    }

    pub fn special(&self, source: VertexId, target: VertexId) -> VertexId {
        self.split(source, target).0
    }

    pub fn common(&self, source: VertexId, target: VertexId) -> VertexId {
        self.split(source, target).1
    }
}

impl FromStr for SpecialSide {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "source" => Ok(SpecialSide::Source),
            "target" => Ok(SpecialSide::Target),
            _ => Err(Error::UnknownSpecialSide(text.to_string())),
        }
    }
}

impl fmt::Display for SpecialSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpecialSide::Source => write!(f, "source"),
            SpecialSide::Target => write!(f, "target"),
        }
    }
}

/// How much a single edge contributes to its special vertex's vote for a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoteWeighting {
    /// Every edge votes 1.0.
    #[default]
    Uniform,
    /// Every edge votes `1 / (common_degree + 1)`, so edges to popular common
    /// vertices count for less.
    InverseDegree,
}

impl VoteWeighting {
    pub fn weight(&self, common_degree: u64) -> f64 {
        match self {
            VoteWeighting::Uniform => 1.0,
            VoteWeighting::InverseDegree => 1.0 / (common_degree as f64 + 1.0),
        }
    }
}

impl FromStr for VoteWeighting {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "uniform" => Ok(VoteWeighting::Uniform),
            "inverse-degree" => Ok(VoteWeighting::InverseDegree),
            _ => Err(Error::UnknownWeighting(text.to_string())),
        }
    }
}

impl fmt::Display for VoteWeighting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VoteWeighting::Uniform => write!(f, "uniform"),
            VoteWeighting::InverseDegree => write!(f, "inverse-degree"),
        }
    }
}

/// Which ingress places the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressKind {
    /// Locality-aware placement for bipartite-like graphs.
    Bipartite,
    /// Plain hash placement of edges and vertices.
    Hash,
}

impl FromStr for IngressKind {
    type Err = Error;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "bipartite" => Ok(IngressKind::Bipartite),
            "hash" => Ok(IngressKind::Hash),
            _ => Err(Error::UnknownIngress(text.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngressConfig {
    pub special: SpecialSide,
    pub weighting: VoteWeighting,
}

impl IngressConfig {
    /// Configuration with the given special side and uniform vote weighting.
    pub fn new(special: &str) -> Result<Self, Error> {
        Ok(IngressConfig { special: special.parse()?, weighting: VoteWeighting::Uniform })
    }

    pub fn with_weighting(mut self, weighting: VoteWeighting) -> Self {
        self.weighting = weighting;
        self
    }
}

impl Default for IngressConfig {
    fn default() -> Self {
        IngressConfig { special: SpecialSide::Source, weighting: VoteWeighting::Uniform }
    }
}
