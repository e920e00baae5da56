#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown special side {0:?}, expected \"source\" or \"target\"")]
    UnknownSpecialSide(String),

    #[error("unknown vote weighting {0:?}, expected \"uniform\" or \"inverse-degree\"")]
    UnknownWeighting(String),

    #[error("unknown ingress {0:?}, expected \"bipartite\" or \"hash\"")]
    UnknownIngress(String),

    #[error("local vertex ids exhausted after {0} vertices")]
    LocalIdsExhausted(usize),
}
