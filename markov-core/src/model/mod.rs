//! First-order Markov chain over discrete symbols.
//!
//! - Transition-frequency model built from a sequence (`TransitionModel`)
//! - Outgoing transitions of a single symbol (`State`)
//! - Bounded random walks over a model (`Walker`)

/// Model builder and read-only queries.
pub mod transition_model;

/// Outgoing transitions of one symbol and weighted sampling.
pub mod state;

/// Random walk generation.
///
/// Walks stop on a dead end or once the requested length is reached.
pub mod walker;
