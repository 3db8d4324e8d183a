use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::state::State;
use super::walker::Walker;

/// First-order Markov model over a sequence of symbols.
///
/// The `TransitionModel` maps every distinct symbol of its input to a
/// [`State`] holding the observed successors of that symbol and how many
/// times each adjacent pair was seen.
///
/// # Responsibilities
/// - Build the model from a sequence in a single pass
/// - Provide read-only access to states and transition counts
/// - Hand out [`Walker`]s generating random walks over the model
///
/// # Invariants
/// - Every symbol of the input has a state, even the last one (dead end)
/// - Counts include overlapping occurrences ("DDD" counts (D, D) twice)
/// - The model is never mutated once built
#[derive(Serialize, Clone, Debug)]
#[serde(transparent)]
pub struct TransitionModel<S> {
	/// Mapping from a source symbol to its outgoing transitions, in first-seen order.
	states: IndexMap<S, State<S>>,
}

impl<S: Clone + Eq + Hash> TransitionModel<S> {
	/// Builds a model from an ordered sequence of symbols.
	///
	/// Scans the sequence left to right keeping the previous symbol:
	/// - the current symbol always gets a state, so a symbol seen only at the
	///   end of the sequence is still represented (with no transitions)
	/// - the pair (previous, current) is counted once more
	///
	/// An empty sequence yields an empty model.
	pub fn build<I>(sequence: I) -> Self
	where
		I: IntoIterator<Item = S>,
	{
		let mut states: IndexMap<S, State<S>> = IndexMap::new();
		let mut previous: Option<S> = None;

		for symbol in sequence {
			states.entry(symbol.clone()).or_default();
			if let Some(prev) = previous.take() {
				states.entry(prev).or_default().add_transition(symbol.clone());
			}
			previous = Some(symbol);
		}

		let model = Self { states };
		debug!(
			symbols = model.len(),
			edges = model.states.values().map(|state| state.transitions().count()).sum::<usize>(),
			"transition model built"
		);
		model
	}

	/// Number of distinct symbols.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// `true` if the model was built from an empty sequence.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// `true` if `symbol` occurred in the input.
	pub fn contains(&self, symbol: &S) -> bool {
		self.states.contains_key(symbol)
	}

	/// Iterates over the distinct symbols in first-seen order.
	pub fn symbols(&self) -> impl Iterator<Item = &S> {
		self.states.keys()
	}

	/// Returns the state of `symbol`, `None` if it never occurred.
	pub fn state(&self, symbol: &S) -> Option<&State<S>> {
		self.states.get(symbol)
	}

	/// Iterates over `(symbol, state)` pairs in first-seen order.
	pub fn states(&self) -> impl Iterator<Item = (&S, &State<S>)> {
		self.states.iter()
	}

	/// Number of times `to` directly followed `from` (0 if never).
	pub fn count(&self, from: &S, to: &S) -> usize {
		self.state(from).map_or(0, |state| state.count(to))
	}

	/// `Some(true)` if `symbol` has no successor, `None` if unknown.
	pub fn is_dead_end(&self, symbol: &S) -> Option<bool> {
		self.state(symbol).map(State::is_dead_end)
	}

	/// Returns a walker generating random walks over this model.
	pub fn walker(&self) -> Walker<'_, S> {
		Walker::new(self)
	}
}

impl TransitionModel<char> {
	/// Builds a character-level model from a text.
	pub fn from_text(text: &str) -> Self {
		Self::build(text.chars())
	}
}

impl<S: Eq + Hash> Default for TransitionModel<S> {
	fn default() -> Self {
		Self { states: IndexMap::new() }
	}
}

impl<S: Eq + Hash> PartialEq for TransitionModel<S> {
	fn eq(&self, other: &Self) -> bool {
		self.states == other.states
	}
}

impl<S: Eq + Hash> Eq for TransitionModel<S> {}
