//! Actor configuration.

use serde::{Deserialize, Serialize};

/// Default inbound mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

/// How strictly decoded arguments must match declared parameter kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgMatching {
	/// Argument kinds must equal declared kinds.
	#[default]
	Exact,
	/// Kinds match by family. Integers of any width or signedness are
	/// accepted where an integer parameter is declared and narrowed with a
	/// range check.
	Coarse,
}

/// Configuration for one actor.
///
/// Deserializable so servers can embed it in their own config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
	/// Name used in logs.
	pub name: String,
	/// Inbound mailbox capacity. Senders block when it is full.
	pub mailbox_capacity: usize,
	pub arg_matching: ArgMatching,
}

impl ActorConfig {
	/// Creates a config with the given name and default settings.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Sets the mailbox capacity.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	#[must_use]
	pub fn with_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		self.mailbox_capacity = capacity;
		self
	}

	#[must_use]
	pub fn with_arg_matching(mut self, arg_matching: ArgMatching) -> Self {
		self.arg_matching = arg_matching;
		self
	}
}

impl Default for ActorConfig {
	fn default() -> Self {
		Self {
			name: String::from("actor"),
			mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
			arg_matching: ArgMatching::Exact,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn deserializes_partial_table_with_defaults() {
		let config: ActorConfig = toml::from_str(
			r#"
			name = "account"
			arg_matching = "coarse"
			"#,
		)
		.expect("valid config");
		assert_eq!(
			config,
			ActorConfig {
				name: "account".into(),
				mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
				arg_matching: ArgMatching::Coarse,
			}
		);
	}

	#[test]
	#[should_panic(expected = "mailbox capacity must be > 0")]
	fn zero_capacity_is_rejected() {
		let _ = ActorConfig::new("zero").with_capacity(0);
	}
}
