use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Label counts observed after one fixed context.
///
/// A `State` is a node of a back-off model: `key` is the context (the
/// most recent ids before the label, oldest first) and `transitions`
/// counts how often each label followed it during fitting.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct State {
	key: Vec<u32>,
	/// Example: { 4 => 42, 9 => 3 }
	transitions: HashMap<u32, usize>,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(key: &[u32]) -> Self {
		Self {
			key: key.to_vec(),
			transitions: HashMap::new(),
		}
	}

	/// Records one occurrence of `label` after this context.
	pub fn add_transition(&mut self, label: u32) {
		*self.transitions.entry(label).or_insert(0) += 1;
	}

	/// Total number of recorded occurrences.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Writes the label distribution of this context into `row`.
	///
	/// Each label gets `count / total`.
	///
	/// # Errors
	/// Returns an error if the state is empty or a label does not fit `row`.
	pub fn fill_distribution(&self, row: &mut [f32]) -> Result<(), String> {
		let total = self.total();
		if total == 0 {
			return Err("state has no transitions".to_owned());
		}
		let classes = row.len();
		row.iter_mut().for_each(|p| *p = 0.0);
		for (label, occurrence) in &self.transitions {
			let slot = row
				.get_mut(*label as usize)
				.ok_or_else(|| format!("label {label} outside {classes} classes"))?;
			*slot = *occurrence as f32 / total as f32;
		}
		Ok(())
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same context (`key`).
	/// Transition occurrence counts are summed.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err("Key mismatch".to_owned());
		}

		for (label, occurrence) in &other.transitions {
			*self.transitions.entry(*label).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}
