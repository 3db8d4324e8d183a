use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;
use tracing::{debug, trace};

use crate::error::WalkError;
use super::transition_model::TransitionModel;

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
	/// The last symbol has no outgoing transition.
	DeadEnd,
	/// The walk reached its maximum length.
	LengthExhausted,
}

/// Result of a traced walk: the generated symbols and the terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk<S> {
	/// Generated symbols, starting with the start symbol.
	pub symbols: Vec<S>,
	/// Terminal state of the walk.
	pub end: WalkEnd,
}

/// Generates bounded random walks over a [`TransitionModel`].
///
/// # Responsibilities
/// - Validate the walk request (length, start symbol) before sampling
/// - Step from symbol to symbol using weighted sampling
/// - Stop on a dead end or when the length budget is spent
///
/// The model is only borrowed immutably, so any number of walkers can share
/// it. Each walk draws from its own random source.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'m, S> {
	model: &'m TransitionModel<S>,
}

impl<'m, S> Walker<'m, S> {
	/// Creates a walker over `model`.
	pub fn new(model: &'m TransitionModel<S>) -> Self {
		Self { model }
	}
}

impl<'m, S> Walker<'m, S>
where
	S: Clone + Eq + Hash + Debug,
{
	/// Generates a walk using the thread-local random source.
	///
	/// See [`Walker::trace`] for the rules of the walk.
	pub fn walk(&self, start: &S, max_length: usize) -> Result<Vec<S>, WalkError> {
		self.walk_with_rng(start, max_length, &mut rand::rng())
	}

	/// Generates a walk drawing from `rng`.
	///
	/// A seeded `rng` makes the walk reproducible for a given model.
	pub fn walk_with_rng<R: Rng>(&self, start: &S, max_length: usize, rng: &mut R) -> Result<Vec<S>, WalkError> {
		Ok(self.trace(start, max_length, rng)?.symbols)
	}

	/// Generates a walk and reports how it ended.
	///
	/// # Behavior
	/// - The walk always begins with `start`.
	/// - While fewer than `max_length` symbols were produced, the next symbol is
	///   sampled among the successors of the current one, proportionally to
	///   the observed counts.
	/// - A symbol without successor ends the walk early (`WalkEnd::DeadEnd`).
	/// - `max_length == 1` returns `[start]` without sampling.
	///
	/// # Errors
	/// - `WalkError::InvalidLength` if `max_length` is 0.
	/// - `WalkError::UnknownStartSymbol` if `start` is not in the model.
	pub fn trace<R: Rng>(&self, start: &S, max_length: usize, rng: &mut R) -> Result<Walk<S>, WalkError> {
		if max_length < 1 {
			return Err(WalkError::InvalidLength(max_length));
		}
		let mut state = self
			.model
			.state(start)
			.ok_or_else(|| WalkError::UnknownStartSymbol(format!("{start:?}")))?;

		let mut symbols = vec![start.clone()];
		let mut remaining = max_length;

		let end = loop {
			if remaining <= 1 {
				break WalkEnd::LengthExhausted;
			}
			let Some(next) = state.predict(rng) else {
				break WalkEnd::DeadEnd;
			};
			trace!(symbol = ?next, "walk step");
			symbols.push(next.clone());
			remaining -= 1;

			// Every symbol seen during the build has a state
			state = match self.model.state(next) {
				Some(next_state) => next_state,
				None => break WalkEnd::DeadEnd,
			};
		};

		debug!(start = ?start, length = symbols.len(), max_length, end = ?end, "walk finished");
		Ok(Walk { symbols, end })
	}
}
