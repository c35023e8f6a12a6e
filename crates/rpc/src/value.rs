//! Dynamically typed argument values and their kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One decoded call argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RpcValue {
	Bool(bool),
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	U8(u8),
	U16(u16),
	U32(u32),
	U64(u64),
	F32(f32),
	F64(f64),
	Str(String),
	Bytes(Vec<u8>),
	/// Serde payload of a named message type, encoded with postcard.
	Struct { type_name: String, data: Vec<u8> },
}

impl RpcValue {
	/// Returns the kind of this value.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Bool(_) => ValueKind::Bool,
			Self::I8(_) => ValueKind::I8,
			Self::I16(_) => ValueKind::I16,
			Self::I32(_) => ValueKind::I32,
			Self::I64(_) => ValueKind::I64,
			Self::U8(_) => ValueKind::U8,
			Self::U16(_) => ValueKind::U16,
			Self::U32(_) => ValueKind::U32,
			Self::U64(_) => ValueKind::U64,
			Self::F32(_) => ValueKind::F32,
			Self::F64(_) => ValueKind::F64,
			Self::Str(_) => ValueKind::Str,
			Self::Bytes(_) => ValueKind::Bytes,
			Self::Struct { .. } => ValueKind::Struct,
		}
	}

	/// Returns the value widened to `i128` if it is any integer kind.
	pub fn as_integer(&self) -> Option<i128> {
		Some(match *self {
			Self::I8(v) => v.into(),
			Self::I16(v) => v.into(),
			Self::I32(v) => v.into(),
			Self::I64(v) => v.into(),
			Self::U8(v) => v.into(),
			Self::U16(v) => v.into(),
			Self::U32(v) => v.into(),
			Self::U64(v) => v.into(),
			_ => return None,
		})
	}
}

impl fmt::Display for RpcValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(v) => write!(f, "{v}"),
			Self::F32(v) => write!(f, "{v}"),
			Self::F64(v) => write!(f, "{v}"),
			Self::Str(v) => write!(f, "{v:?}"),
			Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
			Self::Struct { type_name, data } => write!(f, "{type_name}{{{} bytes}}", data.len()),
			other => match other.as_integer() {
				Some(v) => write!(f, "{v}"),
				None => Ok(()),
			},
		}
	}
}

/// Kind of a value or declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Bool,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
	F32,
	F64,
	Str,
	Bytes,
	Struct,
}

/// Coarse grouping of kinds used by loose argument matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindFamily {
	Bool,
	/// Every integer width and signedness.
	Int,
	Float,
	Str,
	Bytes,
	Struct,
}

impl ValueKind {
	/// Coarse family. Signed and unsigned integers share one family; the
	/// receiving parameter range-checks the value.
	pub const fn family(self) -> KindFamily {
		match self {
			Self::Bool => KindFamily::Bool,
			Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::U16 | Self::U32 | Self::U64 => KindFamily::Int,
			Self::F32 | Self::F64 => KindFamily::Float,
			Self::Str => KindFamily::Str,
			Self::Bytes => KindFamily::Bytes,
			Self::Struct => KindFamily::Struct,
		}
	}

	/// Name used when rendering signatures.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::I8 => "i8",
			Self::I16 => "i16",
			Self::I32 => "i32",
			Self::I64 => "i64",
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::F32 => "f32",
			Self::F64 => "f64",
			Self::Str => "string",
			Self::Bytes => "bytes",
			Self::Struct => "struct",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
	pub kind: ValueKind,
	/// Rust type name, used only for diagnostics.
	pub type_name: &'static str,
}

/// Declared parameter shape of a registered handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
	params: Vec<Param>,
}

impl Signature {
	/// Builds a signature from declared parameters in call order.
	pub fn new(params: Vec<Param>) -> Self {
		Self { params }
	}

	/// Number of declared parameters.
	pub fn arity(&self) -> usize {
		self.params.len()
	}

	/// Declared parameters in call order.
	pub fn params(&self) -> &[Param] {
		&self.params
	}

	/// Renders the kinds of a received argument list the same way as a signature.
	pub fn describe_args(args: &[RpcValue]) -> String {
		let mut out = String::from("fn(");
		for (i, arg) in args.iter().enumerate() {
			if i > 0 {
				out.push_str(", ");
			}
			out.push_str(arg.kind().as_str());
			out.push(' ');
			out.push_str(&arg.to_string());
		}
		out.push(')');
		out
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("fn(")?;
		for (i, param) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			if param.kind == ValueKind::Struct {
				write!(f, "struct {}", short_type_name(param.type_name))?;
			} else {
				f.write_str(param.kind.as_str())?;
			}
		}
		f.write_str(")")
	}
}

/// Strips the module path from a `std::any::type_name` string.
pub(crate) fn short_type_name(full: &str) -> &str {
	let head = full.split('<').next().unwrap_or(full);
	head.rsplit("::").next().unwrap_or(head)
}
