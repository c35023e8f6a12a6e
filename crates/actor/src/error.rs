//! Error types for actor registration, enqueue and dispatch.

use citadel_rpc::{CodecError, Signature};
use thiserror::Error;

/// Configuration error in a call registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// Two handlers normalize to the same function name.
	#[error("actor call [{name}] registered twice")]
	Duplicate {
		/// Normalized function name.
		name: String,
	},
}

/// Error from a non-blocking enqueue.
#[derive(Debug, Error)]
pub enum SendError {
	/// The actor has terminated and its mailbox is closed.
	#[error("actor mailbox closed")]
	Closed,
	/// The mailbox is at capacity.
	#[error("actor mailbox full")]
	Full,
	/// The call could not be encoded.
	#[error(transparent)]
	Encode(#[from] CodecError),
}

/// Reason a dispatched message was dropped. Logged, never returned to senders.
#[derive(Debug, Error)]
pub(crate) enum DispatchError {
	#[error("no handler registered")]
	Unknown,

	#[error("undecodable frame: {0}")]
	Decode(#[source] CodecError),

	#[error("argument count mismatch: declared {declared}, received {received}")]
	Arity { declared: Signature, received: String },

	#[error("argument kind mismatch: declared {declared}, received {received}")]
	Kind { declared: Signature, received: String },

	#[error("argument conversion failed for {declared}: {source}")]
	Convert {
		declared: Signature,
		#[source]
		source: CodecError,
	},
}
