use std::env;
use std::num::ParseIntError;
use thiserror::Error;

pub const DEFAULT_SPACE_CAPACITY: usize = 1024;
pub const DEFAULT_ROOT_CAPACITY: usize = 512;

/// Chunk references are 32-bit slot indices, so a space cannot be larger than this.
pub const MAX_SPACE_CAPACITY: usize = u32::MAX as usize;

pub const SPACE_CAPACITY_VAR: &str = "CHENEY_SPACE_CAPACITY";
pub const ROOT_CAPACITY_VAR: &str = "CHENEY_ROOT_CAPACITY";

/// Sizes of a heap, fixed for its whole life.
///
/// Both semi-spaces share `space_capacity`, so a collection can never run out of room.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HeapConfig {
	/// Chunk slots in each of the two spaces.
	pub space_capacity: usize,
	/// Maximum number of entries in the root set.
	pub root_capacity: usize,
}

impl HeapConfig {
	pub fn new(space_capacity: usize, root_capacity: usize) -> Result<HeapConfig, ConfigError> {
		HeapConfig {
			space_capacity,
			root_capacity,
		}
		.validated()
	}

	/// Starts from the defaults and applies `CHENEY_SPACE_CAPACITY` / `CHENEY_ROOT_CAPACITY`.
	pub fn from_env() -> Result<HeapConfig, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<HeapConfig, ConfigError> {
		let mut config = HeapConfig::default();
		if let Some(value) = lookup(SPACE_CAPACITY_VAR) {
			config.space_capacity = parse_var(SPACE_CAPACITY_VAR, &value)?;
		}
		if let Some(value) = lookup(ROOT_CAPACITY_VAR) {
			config.root_capacity = parse_var(ROOT_CAPACITY_VAR, &value)?;
		}
		config.validated()
	}

	pub fn with_space_capacity(mut self, space_capacity: usize) -> Result<HeapConfig, ConfigError> {
		self.space_capacity = space_capacity;
		self.validated()
	}

	pub fn with_root_capacity(mut self, root_capacity: usize) -> Result<HeapConfig, ConfigError> {
		self.root_capacity = root_capacity;
		self.validated()
	}

	fn validated(self) -> Result<HeapConfig, ConfigError> {
		if self.space_capacity == 0 {
			return Err(ConfigError::ZeroCapacity("space"));
		}
		if self.space_capacity > MAX_SPACE_CAPACITY {
			return Err(ConfigError::SpaceTooLarge(self.space_capacity));
		}
		if self.root_capacity == 0 {
			return Err(ConfigError::ZeroCapacity("root set"));
		}
		Ok(self)
	}
}

impl Default for HeapConfig {
	fn default() -> Self {
		HeapConfig {
			space_capacity: DEFAULT_SPACE_CAPACITY,
			root_capacity: DEFAULT_ROOT_CAPACITY,
		}
	}
}

fn parse_var(name: &'static str, value: &str) -> Result<usize, ConfigError> {
	value
		.trim()
		.parse()
		.map_err(|source| ConfigError::InvalidVariable { name, source })
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{0} capacity must be at least one")]
	ZeroCapacity(&'static str),
	#[error("space capacity {0} exceeds the {} slots a chunk reference can address", MAX_SPACE_CAPACITY)]
	SpaceTooLarge(usize),
	#[error("{name} is not a valid capacity: {source}")]
	InvalidVariable {
		name: &'static str,
		source: ParseIntError,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_sizes() {
		let config = HeapConfig::default();
		assert_eq!(config.space_capacity, 1024);
		assert_eq!(config.root_capacity, 512);
	}

	#[test]
	fn rejects_zero_capacities() {
		assert_eq!(
			HeapConfig::new(0, 4),
			Err(ConfigError::ZeroCapacity("space"))
		);
		assert_eq!(
			HeapConfig::new(4, 0),
			Err(ConfigError::ZeroCapacity("root set"))
		);
		assert!(HeapConfig::default().with_root_capacity(0).is_err());
	}

	#[test]
	fn lookup_overrides_defaults() {
		let config = HeapConfig::from_lookup(|name| match name {
			SPACE_CAPACITY_VAR => Some(" 64 ".to_string()),
			_ => None,
		})
		.unwrap();

		assert_eq!(config.space_capacity, 64);
		assert_eq!(config.root_capacity, DEFAULT_ROOT_CAPACITY);
	}

	#[test]
	fn lookup_reports_bad_values() {
		let error = HeapConfig::from_lookup(|name| match name {
			ROOT_CAPACITY_VAR => Some("lots".to_string()),
			_ => None,
		})
		.unwrap_err();

		assert!(matches!(
			error,
			ConfigError::InvalidVariable {
				name: ROOT_CAPACITY_VAR,
				..
			}
		));

		let error = HeapConfig::from_lookup(|name| match name {
			SPACE_CAPACITY_VAR => Some("0".to_string()),
			_ => None,
		})
		.unwrap_err();
		assert_eq!(error, ConfigError::ZeroCapacity("space"));
	}

	#[test]
	#[cfg(target_pointer_width = "64")]
	fn rejects_spaces_too_large_to_address() {
		let too_large = MAX_SPACE_CAPACITY + 2;
		assert_eq!(
			HeapConfig::new(too_large, 1),
			Err(ConfigError::SpaceTooLarge(too_large))
		);
		assert_eq!(
			HeapConfig::default().with_space_capacity(MAX_SPACE_CAPACITY + 1),
			Err(ConfigError::SpaceTooLarge(MAX_SPACE_CAPACITY + 1))
		);

		let error = HeapConfig::from_lookup(|name| match name {
			SPACE_CAPACITY_VAR => Some(too_large.to_string()),
			_ => None,
		})
		.unwrap_err();
		assert_eq!(error, ConfigError::SpaceTooLarge(too_large));

		let largest = HeapConfig::default().with_space_capacity(MAX_SPACE_CAPACITY);
		assert_eq!(largest.map(|config| config.space_capacity), Ok(MAX_SPACE_CAPACITY));
	}
}
