//! Codec contract consumed by actors, and the postcard wire format.

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::head::{PacketHead, RpcHead, RpcPacket};
use crate::value::{RpcValue, Signature};

/// Binding between actors and a concrete call encoding.
///
/// A frame always starts with a head that can be decoded on its own, so
/// network ingress can filter unroutable traffic without paying for the body.
pub trait RpcCodec: Send + Sync + 'static {
	/// Encodes one call.
	fn encode(&self, func_name: &str, head: &RpcHead, args: &[RpcValue]) -> Result<Bytes>;

	/// Decodes the routing head and function name only.
	fn decode_head(&self, frame: &[u8]) -> Result<PacketHead>;

	/// Decodes the whole frame, shaped by the target handler's signature.
	///
	/// Self-describing formats may ignore `signature`; schema-driven formats
	/// use it to pick a decoder per argument.
	fn decode_body(&self, frame: &[u8], signature: &Signature) -> Result<RpcPacket>;
}

/// Postcard frames laid out as `(RpcHead, name, args)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostcardCodec;

impl PostcardCodec {
	pub const fn new() -> Self {
		Self
	}
}

impl RpcCodec for PostcardCodec {
	fn encode(&self, func_name: &str, head: &RpcHead, args: &[RpcValue]) -> Result<Bytes> {
		if func_name.is_empty() {
			return Err(CodecError::EmptyName);
		}
		Ok(Bytes::from(postcard::to_allocvec(&(head, func_name, args))?))
	}

	fn decode_head(&self, frame: &[u8]) -> Result<PacketHead> {
		let ((head, func_name), _body) = postcard::take_from_bytes::<(RpcHead, String)>(frame)?;
		if func_name.is_empty() {
			return Err(CodecError::EmptyName);
		}
		Ok(PacketHead { head, func_name })
	}

	fn decode_body(&self, frame: &[u8], _signature: &Signature) -> Result<RpcPacket> {
		let (head, func_name, args) = postcard::from_bytes::<(RpcHead, String, Vec<RpcValue>)>(frame)?;
		if func_name.is_empty() {
			return Err(CodecError::EmptyName);
		}
		Ok(RpcPacket { head, func_name, args })
	}
}
