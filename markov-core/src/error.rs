use thiserror::Error;

/// Contract violations reported by a walk.
///
/// Both are detected before any sampling happens. Reaching a dead end or
/// exhausting the length budget is a normal outcome and never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
	/// The start symbol has no entry in the model.
	#[error("Unknown start symbol: {0}")]
	UnknownStartSymbol(String),

	#[error("Invalid walk length: {0} (must be >= 1)")]
	InvalidLength(usize),
}
