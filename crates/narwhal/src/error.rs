#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dag(#[from] narwhal_dag::Error),

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("failed to parse layout configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("simplex layering requires a connected graph, but the graph is disconnected")]
    Disconnected,

    #[error("topological coordinates need exactly one real node per layer, but layer {layer} has {real}")]
    NotTopological { layer: usize, real: usize },

    #[error("link {from} -> {to} does not increase the layer ({from_layer} -> {to_layer})")]
    LayeringViolation {
        from: String,
        to: String,
        from_layer: usize,
        to_layer: usize,
    },

    #[error("node {id} has no layer; run a layering operator first")]
    MissingLayer { id: String },

    #[error("problem needs {variables} variables, more than the configured limit of {limit}")]
    TooLarge { variables: usize, limit: usize },

    #[error("solver failed: {message}")]
    Solver { message: String },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
