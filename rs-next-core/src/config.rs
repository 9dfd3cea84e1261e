//! Pipeline configuration.
//!
//! Values can be overridden from the environment with the `RS_NEXT_` prefix
//! (for example `RS_NEXT_TEST_FRACTION=0.1`). Unset variables fall back to
//! [`PipelineConfig::default`].

use crate::error::{NextWordError, Result};

/// Prefix shared by every environment variable read by the workspace.
pub const ENV_PREFIX: &str = "RS_NEXT_";

const ENV_TEST_FRACTION: &str = "TEST_FRACTION";
const ENV_SEED: &str = "SEED";
const ENV_MAX_CONTEXT: &str = "MAX_CONTEXT";

const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Settings for a training run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
	/// Share of the encoded examples held out for evaluation, in (0, 1).
	pub test_fraction: f64,

	/// Seed for the train/test shuffle. `None` draws from the thread RNG.
	pub seed: Option<u64>,

	/// Longest context the built-in classifier conditions on (0 = full width).
	pub max_context: usize,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			test_fraction: DEFAULT_TEST_FRACTION,
			seed: None,
			max_context: 0,
		}
	}
}

impl PipelineConfig {
	/// Builds a configuration from `RS_NEXT_*` variables.
	///
	/// # Errors
	/// Returns [`NextWordError::Config`] if a variable is set but cannot be
	/// parsed, or if the resulting configuration is invalid.
	pub fn from_env() -> Result<Self> {
		let default = Self::default();
		let config = Self {
			test_fraction: env_parsed(&env_key(ENV_TEST_FRACTION))?.unwrap_or(default.test_fraction),
			seed: env_parsed(&env_key(ENV_SEED))?.or(default.seed),
			max_context: env_parsed(&env_key(ENV_MAX_CONTEXT))?.unwrap_or(default.max_context),
		};
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges.
	pub fn validate(&self) -> Result<()> {
		if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
			return Err(NextWordError::Config(format!(
				"test_fraction must be in (0, 1), got {}",
				self.test_fraction
			)));
		}
		Ok(())
	}
}

/// Returns the full variable name for a suffix (`SEED` -> `RS_NEXT_SEED`).
pub fn env_key(suffix: &str) -> String {
	format!("{ENV_PREFIX}{suffix}")
}

/// Reads a variable as a string, `None` if unset.
pub fn env_string(key: &str) -> Result<Option<String>> {
	match std::env::var(key) {
		Ok(s) => Ok(Some(s)),
		Err(std::env::VarError::NotPresent) => Ok(None),
		Err(e) => Err(NextWordError::Config(format!("{key}: {e}"))),
	}
}

/// Reads a variable and parses it into `T`, `None` if unset.
pub fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	match env_string(key)? {
		None => Ok(None),
		Some(s) => s
			.trim()
			.parse()
			.map(Some)
			.map_err(|e| NextWordError::Config(format!("{key}={s:?}: {e}"))),
	}
}
