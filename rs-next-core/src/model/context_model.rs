use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;

/// All contexts of one fixed length `k` and the labels that followed them.
///
/// # Invariants
/// - Each key in `states` has exactly `k` ids
/// - All state transitions have occurrence counts >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContextModel {
	/// Context length; 0 gives the label prior.
	k: usize,

	/// Mapping from a context (length k) to its corresponding state
	states: HashMap<Vec<u32>, State>,
}

impl ContextModel {
	pub fn new(k: usize) -> Self {
		Self { k, states: HashMap::new() }
	}

	/// Number of distinct contexts seen.
	pub fn size(&self) -> usize {
		self.states.len()
	}

	/// Records `label` after the last `k` ids of `history`.
	///
	/// Histories shorter than `k` are ignored.
	pub fn add_example(&mut self, history: &[u32], label: u32) {
		if history.len() < self.k {
			return;
		}
		let key = &history[history.len() - self.k..];
		self.states
			.entry(key.to_vec())
			.or_insert_with(|| State::new(key))
			.add_transition(label);
	}

	/// State for the last `k` ids of `history`, `None` if unseen or too short.
	pub fn lookup(&self, history: &[u32]) -> Option<&State> {
		if history.len() < self.k {
			return None;
		}
		self.states.get(&history[history.len() - self.k..])
	}

	/// Merges another context model into this one.
	///
	/// # Notes
	/// - Both models must have the same context length `k`.
	/// - Occurrence counts for matching states and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the context lengths do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.k != other.k {
			return Err("K mismatch".to_owned());
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}
