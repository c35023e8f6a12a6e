//! Conversions between concrete Rust types and [`RpcValue`]s.

use std::any::type_name;
use std::ops::{Deref, DerefMut};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CodecError, Result};
use crate::value::{Param, RpcValue, ValueKind, short_type_name};

/// A type usable as a handler parameter or an outgoing call argument.
pub trait RpcParam: Sized + Send + 'static {
	/// Kind this parameter declares.
	const KIND: ValueKind;

	/// Type name reported in handler signatures.
	fn type_name() -> &'static str {
		type_name::<Self>()
	}

	/// Declared parameter descriptor.
	fn param() -> Param {
		Param {
			kind: Self::KIND,
			type_name: Self::type_name(),
		}
	}

	fn into_value(self) -> Result<RpcValue>;

	/// Converts a decoded argument into this type.
	///
	/// Integer parameters accept any integer value that fits their width.
	fn from_value(value: RpcValue) -> Result<Self>;
}

fn mismatch<T>(expected: ValueKind, value: &RpcValue) -> Result<T> {
	Err(CodecError::KindMismatch {
		expected,
		got: value.kind(),
	})
}

macro_rules! int_param {
	($($ty:ty => $variant:ident),* $(,)?) => {$(
		impl RpcParam for $ty {
			const KIND: ValueKind = ValueKind::$variant;

			fn into_value(self) -> Result<RpcValue> {
				Ok(RpcValue::$variant(self))
			}

			fn from_value(value: RpcValue) -> Result<Self> {
				if let RpcValue::$variant(v) = value {
					return Ok(v);
				}
				let Some(wide) = value.as_integer() else {
					return mismatch(Self::KIND, &value);
				};
				<$ty>::try_from(wide).map_err(|_| CodecError::OutOfRange {
					value: wide,
					target: Self::KIND,
				})
			}
		}
	)*};
}

int_param! {
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
}

impl RpcParam for bool {
	const KIND: ValueKind = ValueKind::Bool;

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::Bool(self))
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		match value {
			RpcValue::Bool(v) => Ok(v),
			other => mismatch(Self::KIND, &other),
		}
	}
}

impl RpcParam for f32 {
	const KIND: ValueKind = ValueKind::F32;

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::F32(self))
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		match value {
			RpcValue::F32(v) => Ok(v),
			other => mismatch(Self::KIND, &other),
		}
	}
}

impl RpcParam for f64 {
	const KIND: ValueKind = ValueKind::F64;

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::F64(self))
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		match value {
			RpcValue::F64(v) => Ok(v),
			RpcValue::F32(v) => Ok(v.into()),
			other => mismatch(Self::KIND, &other),
		}
	}
}

impl RpcParam for String {
	const KIND: ValueKind = ValueKind::Str;

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::Str(self))
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		match value {
			RpcValue::Str(v) => Ok(v),
			other => mismatch(Self::KIND, &other),
		}
	}
}

impl RpcParam for Vec<u8> {
	const KIND: ValueKind = ValueKind::Bytes;

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::Bytes(self))
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		match value {
			RpcValue::Bytes(v) => Ok(v),
			other => mismatch(Self::KIND, &other),
		}
	}
}

/// Struct-kind parameter carrying any serde message type.
///
/// The message travels as a postcard payload tagged with the type's short
/// name; decoding rejects a payload tagged with a different name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Msg<T>(pub T);

impl<T> Msg<T> {
	pub fn into_inner(self) -> T {
		self.0
	}
}

impl<T> Deref for Msg<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.0
	}
}

impl<T> DerefMut for Msg<T> {
	fn deref_mut(&mut self) -> &mut T {
		&mut self.0
	}
}

impl<T> RpcParam for Msg<T>
where
	T: Serialize + DeserializeOwned + Send + 'static,
{
	const KIND: ValueKind = ValueKind::Struct;

	fn type_name() -> &'static str {
		type_name::<T>()
	}

	fn into_value(self) -> Result<RpcValue> {
		Ok(RpcValue::Struct {
			type_name: short_type_name(type_name::<T>()).to_owned(),
			data: postcard::to_allocvec(&self.0)?,
		})
	}

	fn from_value(value: RpcValue) -> Result<Self> {
		let RpcValue::Struct { type_name: got, data } = value else {
			return mismatch(Self::KIND, &value);
		};
		let expected = short_type_name(type_name::<T>());
		if got != expected {
			return Err(CodecError::TypeMismatch {
				expected: expected.to_owned(),
				got,
			});
		}
		Ok(Self(postcard::from_bytes(&data)?))
	}
}

/// An argument list for an outgoing call.
///
/// Implemented for tuples of [`RpcParam`]s up to eight elements, and for a
/// prebuilt `Vec<RpcValue>`.
pub trait RpcArgs {
	fn into_values(self) -> Result<Vec<RpcValue>>;
}

impl RpcArgs for Vec<RpcValue> {
	fn into_values(self) -> Result<Vec<RpcValue>> {
		Ok(self)
	}
}

macro_rules! tuple_args {
	($($name:ident),*) => {
		impl<$($name: RpcParam),*> RpcArgs for ($($name,)*) {
			#[allow(non_snake_case, unused_variables)]
			fn into_values(self) -> Result<Vec<RpcValue>> {
				let ($($name,)*) = self;
				Ok(vec![$($name.into_value()?),*])
			}
		}
	};
}

tuple_args!();
tuple_args!(A1);
tuple_args!(A1, A2);
tuple_args!(A1, A2, A3);
tuple_args!(A1, A2, A3, A4);
tuple_args!(A1, A2, A3, A4, A5);
tuple_args!(A1, A2, A3, A4, A5, A6);
tuple_args!(A1, A2, A3, A4, A5, A6, A7);
tuple_args!(A1, A2, A3, A4, A5, A6, A7, A8);
