use std::fmt;

/// Failure raised by a layout collaborator, carried through unmodified.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Distance,
    Embedding,
    Centrality,
    Overlap,
    Routing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Distance => "distance",
            Stage::Embedding => "embedding",
            Stage::Centrality => "centrality",
            Stage::Overlap => "overlap",
            Stage::Routing => "routing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("edge {edge_id} references a missing node: {node_id}")]
    MissingEndpoint { edge_id: String, node_id: String },

    #[error("{stage} stage failed: {source}")]
    Oracle {
        stage: Stage,
        #[source]
        source: OracleError,
    },

    #[error("{stage} stage returned {actual} values, expected {expected}")]
    Misaligned {
        stage: Stage,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} stage returned a non-finite value")]
    NonFinite { stage: Stage },

    #[error("layout cancelled before the {before} stage")]
    Cancelled { before: Stage },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// The stage this failure is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Oracle { stage, .. }
            | Error::Misaligned { stage, .. }
            | Error::NonFinite { stage } => Some(*stage),
            Error::Cancelled { before } => Some(*before),
            Error::InvalidConfiguration { .. } | Error::MissingEndpoint { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
