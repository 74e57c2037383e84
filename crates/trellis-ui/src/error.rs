use thiserror::Error;
use trellis_toolkit::ToolkitError;

/// Failures surfaced by the bridge protocol.
///
/// Everything here crosses the script boundary as a Lua error except where the
/// bridge handles it internally (redundant destruction during finalize).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or missing construction input.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An operation argument was not a wrapped component.
    #[error("expected a wrapped component, got {got}")]
    TypeMismatch { got: String },

    /// Operation on a finalized handle. Programming-error class, not routine
    /// control flow.
    #[error("{kind} {uid}: operation on finalized handle")]
    UseAfterFree { kind: &'static str, uid: String },

    /// The native widget reports itself already destroyed (ancestor teardown).
    #[error("{kind} {uid}: native widget no longer exists")]
    ToolkitInvalidState { kind: &'static str, uid: String },

    /// Operation not in the widget kind's capability set.
    #[error("operation {op} not supported by {kind}")]
    UnsupportedOperation {
        op: &'static str,
        kind: &'static str,
    },

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}

impl From<BridgeError> for mlua::Error {
    fn from(err: BridgeError) -> Self {
        mlua::Error::external(err)
    }
}
