use std::hash::Hash;

use indexmap::IndexMap;
use rand::Rng;
use serde::Serialize;

/// Outgoing transitions of one source symbol.
///
/// A `State` is a node of the Markov chain: every edge leads to a
/// destination symbol and is weighted by the number of times the pair
/// (source, destination) was observed.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences while the model is built
/// - Predict the next symbol using weighted random sampling
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - A state without transitions is a dead end
#[derive(Serialize, Clone, Debug)]
#[serde(transparent)]
pub struct State<S> {
	/// Outgoing transitions in first-seen order.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: IndexMap<S, usize>,
}

impl<S: Eq + Hash> State<S> {
	/// Creates a new state without transitions.
	pub(crate) fn new() -> Self {
		Self { transitions: IndexMap::new() }
	}

	/// Records an occurrence of a transition toward `next`.
	pub(crate) fn add_transition(&mut self, next: S) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Number of times the transition toward `next` was observed (0 if never).
	pub fn count(&self, next: &S) -> usize {
		self.transitions.get(next).copied().unwrap_or(0)
	}

	/// Sum of all outgoing occurrence counts.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// `true` when no transition leaves this state.
	pub fn is_dead_end(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates over `(destination, count)` pairs.
	pub fn transitions(&self) -> impl Iterator<Item = (&S, usize)> {
		self.transitions.iter().map(|(next, occurrence)| (next, *occurrence))
	}

	/// Predicts the next symbol using weighted random sampling.
	///
	/// The probability of selecting a destination is proportional to its
	/// occurrence count. Draws a number in `0..total` then walks the
	/// transitions subtracting counts until the draw falls in a bucket.
	///
	/// Returns `None` on a dead end.
	pub fn predict<R: Rng>(&self, rng: &mut R) -> Option<&S> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next);
			}
			r -= occurrence;
		}

		// Unreachable while counts sum to `total`
		None
	}
}

impl<S: Eq + Hash> Default for State<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: Eq + Hash> PartialEq for State<S> {
	fn eq(&self, other: &Self) -> bool {
		self.transitions == other.transitions
	}
}

impl<S: Eq + Hash> Eq for State<S> {}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn add_transition_accumulates() {
		let mut state = State::new();
		state.add_transition('a');
		state.add_transition('b');
		state.add_transition('a');

		assert_eq!(state.count(&'a'), 2);
		assert_eq!(state.count(&'b'), 1);
		assert_eq!(state.count(&'z'), 0);
		assert_eq!(state.total(), 3);
		assert!(!state.is_dead_end());
	}

	#[test]
	fn empty_state_is_dead_end() {
		let state: State<char> = State::new();
		let mut rng = StdRng::seed_from_u64(7);

		assert!(state.is_dead_end());
		assert_eq!(state.predict(&mut rng), None);
	}

	#[test]
	fn single_transition_is_always_chosen() {
		let mut state = State::new();
		state.add_transition('x');
		let mut rng = StdRng::seed_from_u64(1);

		for _ in 0..100 {
			assert_eq!(state.predict(&mut rng), Some(&'x'));
		}
	}

	#[test]
	fn prediction_follows_weights() {
		let mut state = State::new();
		for _ in 0..3 {
			state.add_transition('a');
		}
		state.add_transition('b');
		let mut rng = StdRng::seed_from_u64(42);

		let draws = 20_000;
		let mut hits_a = 0;
		for _ in 0..draws {
			match state.predict(&mut rng) {
				Some('a') => hits_a += 1,
				Some('b') => (),
				other => panic!("unexpected prediction {other:?}"),
			}
		}

		// Expected ratio is 0.75
		let ratio = hits_a as f64 / draws as f64;
		assert!((0.70..0.80).contains(&ratio), "ratio = {ratio}");
	}

	#[test]
	fn equality_ignores_insertion_order() {
		let mut left = State::new();
		left.add_transition('a');
		left.add_transition('b');
		let mut right = State::new();
		right.add_transition('b');
		right.add_transition('a');

		assert_eq!(left, right);
	}
}
