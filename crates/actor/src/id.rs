use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-wide actor identity seed. Only ever incremented.
static NEXT_ACTOR_ID: AtomicI64 = AtomicI64::new(0);

/// Unique identity of one actor for the life of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(i64);

impl ActorId {
	/// Identity of an actor that has not been configured or has terminated.
	pub const NONE: Self = Self(0);

	/// Allocates the next identity. Never returns [`Self::NONE`] and never repeats.
	pub fn allocate() -> Self {
		Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}

	pub const fn from_raw(raw: i64) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> i64 {
		self.0
	}

	pub const fn is_none(self) -> bool {
		self.0 == 0
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
