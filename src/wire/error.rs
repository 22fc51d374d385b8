//! The traversal error taxonomy.

use thiserror::Error;

/// Alias for a [`Result`] carrying a [`WireError`].
pub type WireResult<T> = Result<T, WireError>;

/// Anything that can go wrong while writing or reading an object graph.
#[derive(Debug, Error)]
pub enum WireError {
    /// The data on the wire does not match the expected shape.
    #[error("malformed wire data: {0}")]
    Format(String),

    /// A type tag could not be resolved against the registry, or resolved
    /// ambiguously.
    #[error("cannot resolve type: {0}")]
    TypeResolution(String),

    /// A failure while traversing a named member. Wraps the innermost cause
    /// exactly once; outer member boundaries pass it through.
    #[error("in member `{name}` (depth {depth}): {source}")]
    Member {
        /// Name of the member being traversed.
        name: String,
        /// Traversal depth at the point of failure.
        depth: usize,
        /// The underlying failure.
        source: Box<WireError>,
    },

    /// A member slot could not be accessed on the target value.
    #[error("member access failed: {0}")]
    MemberAccess(String),

    /// The value cannot be carried by any codec path and no fallback codec
    /// is installed.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// Settings changes are rejected once traversal has started.
    #[error("settings are frozen once traversal has started")]
    SettingsFrozen,

    /// An underlying transport failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// Wraps `self` in a [`WireError::Member`] unless it already carries a
    /// member frame.
    pub(crate) fn into_member(self, name: &str, depth: usize) -> Self {
        match self {
            WireError::Member { .. } => self,
            other => WireError::Member {
                name: name.to_owned(),
                depth,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_frames_do_not_nest() {
        let inner = WireError::Format("boom".into());
        let once = inner.into_member("a", 2);
        let twice = once.into_member("b", 1);
        match twice {
            WireError::Member { name, depth, source } => {
                assert_eq!(name, "a");
                assert_eq!(depth, 2);
                assert!(matches!(*source, WireError::Format(_)));
            }
            other => panic!("expected member frame, got {other}"),
        }
    }
}
