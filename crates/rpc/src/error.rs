//! Error types for RPC encoding and decoding.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised by an [`RpcCodec`](crate::RpcCodec) or by argument conversion.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The frame could not be parsed by the wire format.
	#[error("malformed rpc frame: {0}")]
	Malformed(#[from] postcard::Error),

	/// The frame carried an empty function name.
	#[error("rpc frame has an empty function name")]
	EmptyName,

	/// An argument value did not have the kind the parameter declares.
	#[error("expected {expected} argument, got {got}")]
	KindMismatch {
		/// Declared parameter kind.
		expected: ValueKind,
		/// Kind found on the wire.
		got: ValueKind,
	},

	/// An integer argument does not fit the declared parameter width.
	#[error("integer {value} out of range for {target}")]
	OutOfRange {
		/// Received value.
		value: i128,
		/// Declared parameter kind.
		target: ValueKind,
	},

	/// A handler received a different number of arguments than it declares.
	#[error("expected {expected} arguments, got {got}")]
	ArgumentCount {
		/// Declared parameter count.
		expected: usize,
		/// Decoded argument count.
		got: usize,
	},

	/// A struct argument names a different message type than declared.
	#[error("expected message {expected}, got {got}")]
	TypeMismatch {
		/// Declared message type.
		expected: String,
		/// Message type found on the wire.
		got: String,
	},
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
