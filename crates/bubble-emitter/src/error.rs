use thiserror::Error;

// ---------------------------------------------------------------------------
// TreeError
// ---------------------------------------------------------------------------

/// Raised synchronously by parent/child mutations.
///
/// Registration, removal and dispatch never fail: malformed selectors,
/// duplicate listeners and unmatched removals are silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("The new child contains this emitter; appending it would create a cycle.")]
    WouldCycle,

    #[error("The emitter to be removed is not a child of this emitter.")]
    NotAChild,
}

/// Convenience alias — the default error type is `TreeError`.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
