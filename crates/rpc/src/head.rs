//! Routing metadata carried in front of every call body.

use serde::{Deserialize, Serialize};

use crate::value::RpcValue;

/// Routing metadata of one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpcHead {
	/// Entity the call concerns, such as a client session id.
	pub id: i64,
	/// Socket the packet arrived on. Zero for internal calls.
	pub socket_id: u32,
	/// Actor that originated the call.
	pub call_id: i64,
	/// Cluster node the call is routed to.
	pub cluster_id: u32,
}

/// Result of a head-only decode: enough to route, nothing more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketHead {
	pub head: RpcHead,
	pub func_name: String,
}

/// A fully decoded call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpcPacket {
	pub head: RpcHead,
	pub func_name: String,
	pub args: Vec<RpcValue>,
}
