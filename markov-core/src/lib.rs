//! Markov chain text generation library.
//!
//! This crate provides a first-order Markov chain including:
//! - A transition-frequency model built from any sequence of hashable symbols
//! - Bounded random walks sampled from the observed frequencies
//! - Small I/O helpers for callers reading a corpus from disk
//!
//! ```
//! use markov_core::TransitionModel;
//!
//! let model = TransitionModel::from_text("AB");
//! let walk = model.walker().walk(&'A', 5).unwrap();
//! assert_eq!(walk, vec!['A', 'B']);
//! ```

/// Walk errors.
pub mod error;

/// Corpus loading and tokenization helpers.
pub mod io;

/// Markov model and walk generation.
pub mod model;

/// Corpus used by the demo callers when none is given.
pub const DEFAULT_CORPUS: &str = "The quick brown fox jumped over the lazy dog.";

pub use error::WalkError;
pub use model::state::State;
pub use model::transition_model::TransitionModel;
pub use model::walker::{Walk, WalkEnd, Walker};
