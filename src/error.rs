use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("missing capability: {0}")]
    MissingCapability(&'static str),

    #[error("unknown link: {0}")]
    UnknownLink(String),

    #[error("link has no resource schema: {0}")]
    MissingResourceSchema(String),

    #[error("schema pointer: {0}")]
    Pointer(#[from] PointerError),

    #[error("config error: {0}")]
    Config(String),
}

/// Failure to parse or walk a `$ref` fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("not a local fragment: {0}")]
    NotFragment(String),

    #[error("pointer {0} is not rooted at definitions")]
    UnsupportedRoot(String),

    #[error("pointer {pointer}: segment {segment:?} not found at depth {depth}")]
    MissingSegment {
        pointer: String,
        segment: String,
        depth: usize,
    },

    #[error("pointer {pointer}: value at depth {depth} is not an object or array")]
    NotAContainer { pointer: String, depth: usize },
}
