//! Cache configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::{BuildPolicy, FileSource, GroupId, NO_GROUP, NO_USER, UserId};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("failed to parse configuration: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("invalid configuration: {0}")]
	Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Refresh cadence, source location and record filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	pub update_period_secs: u64,
	pub passwd_path: PathBuf,
	pub group_path: PathBuf,
	pub min_user_id: UserId,
	pub max_user_id: UserId,
	pub min_group_id: GroupId,
	pub max_group_id: GroupId,
	pub omit_user_prefixes: Vec<String>,
	pub omit_group_prefixes: Vec<String>,
	pub exclude_users: Vec<String>,
	pub exclude_groups: Vec<String>,
	pub root_users: Vec<String>,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			update_period_secs: 600,
			passwd_path: PathBuf::from("/etc/passwd"),
			group_path: PathBuf::from("/etc/group"),
			min_user_id: 0,
			max_user_id: NO_USER - 1,
			min_group_id: 0,
			max_group_id: NO_GROUP - 1,
			omit_user_prefixes: Vec::new(),
			omit_group_prefixes: Vec::new(),
			exclude_users: Vec::new(),
			exclude_groups: Vec::new(),
			root_users: Vec::new(),
		}
	}
}

impl CacheConfig {
	/// Parses `text`, reading the table at dotted `prefix` when one is given.
	///
	/// A prefix that names no table yields the defaults.
	pub fn from_toml_str(text: &str, prefix: Option<&str>) -> Result<Self> {
		let mut value = toml::Value::Table(text.parse::<toml::Table>()?);
		if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
			for segment in prefix.split('.') {
				value = match value {
					toml::Value::Table(mut table) => match table.remove(segment) {
						Some(next) => next,
						None => return Ok(Self::default()),
					},
					_ => return Err(ConfigError::Invalid(format!("`{prefix}` is not a table"))),
				};
			}
			if !value.is_table() {
				return Err(ConfigError::Invalid(format!("`{prefix}` is not a table")));
			}
		}
		let config: Self = value.try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses the file at `path`.
	pub fn load(path: &Path, prefix: Option<&str>) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text, prefix)
	}

	pub fn validate(&self) -> Result<()> {
		if self.update_period_secs == 0 {
			return Err(ConfigError::Invalid("update_period_secs must be positive".into()));
		}
		if self.min_user_id > self.max_user_id {
			return Err(ConfigError::Invalid(format!(
				"min_user_id {} exceeds max_user_id {}",
				self.min_user_id, self.max_user_id
			)));
		}
		if self.min_group_id > self.max_group_id {
			return Err(ConfigError::Invalid(format!(
				"min_group_id {} exceeds max_group_id {}",
				self.min_group_id, self.max_group_id
			)));
		}
		Ok(())
	}

	pub fn update_period(&self) -> Duration {
		Duration::from_secs(self.update_period_secs)
	}

	pub fn build_policy(&self) -> BuildPolicy {
		BuildPolicy {
			uid_range: self.min_user_id..=self.max_user_id,
			gid_range: self.min_group_id..=self.max_group_id,
			omit_user_prefixes: self.omit_user_prefixes.clone(),
			omit_group_prefixes: self.omit_group_prefixes.clone(),
			exclude_users: self.exclude_users.iter().cloned().collect(),
			exclude_groups: self.exclude_groups.iter().cloned().collect(),
			root_users: self.root_users.clone(),
		}
	}

	pub fn file_source(&self) -> FileSource {
		FileSource::new(&self.passwd_path, &self.group_path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_text_yields_defaults() {
		let config = CacheConfig::from_toml_str("", None).unwrap();
		assert_eq!(config, CacheConfig::default());
		assert_eq!(config.update_period(), Duration::from_secs(600));
		assert_eq!(config.build_policy(), BuildPolicy::default());
	}

	#[test]
	fn reads_nested_prefix() {
		let text = r#"
			[meta.user_and_group]
			update_period_secs = 30
			min_user_id = 1000
			root_users = ["admin"]
			exclude_groups = ["nogroup"]

			[other]
			update_period_secs = 1
		"#;
		let config = CacheConfig::from_toml_str(text, Some("meta.user_and_group")).unwrap();
		assert_eq!(config.update_period_secs, 30);
		assert_eq!(config.min_user_id, 1000);
		assert_eq!(config.root_users, vec!["admin".to_string()]);

		let policy = config.build_policy();
		assert_eq!(policy.uid_range, 1000..=NO_USER - 1);
		assert!(policy.exclude_groups.contains("nogroup"));
	}

	#[test]
	fn missing_prefix_yields_defaults() {
		let config = CacheConfig::from_toml_str("[a]\nx = 1\n", Some("meta.user_and_group")).unwrap();
		assert_eq!(config, CacheConfig::default());
	}

	#[test]
	fn prefix_through_scalar_is_invalid() {
		let err = CacheConfig::from_toml_str("meta = 3\n", Some("meta.user_and_group")).unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
	}

	#[test]
	fn rejects_unknown_keys_and_bad_ranges() {
		assert!(matches!(
			CacheConfig::from_toml_str("update_period = 5\n", None),
			Err(ConfigError::Parse(_))
		));
		assert!(matches!(
			CacheConfig::from_toml_str("min_group_id = 10\nmax_group_id = 5\n", None),
			Err(ConfigError::Invalid(_))
		));
		assert!(matches!(
			CacheConfig::from_toml_str("update_period_secs = 0\n", None),
			Err(ConfigError::Invalid(_))
		));
	}
}
