use citadel_rpc::RpcHead;

use crate::id::ActorId;

/// Per-call context handed to every handler invocation.
///
/// Built fresh for each dispatched message, so a handler only ever sees the
/// metadata of its own call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
	actor_id: ActorId,
	func_name: String,
	head: RpcHead,
}

impl CallContext {
	pub(crate) fn new(actor_id: ActorId, func_name: String, head: RpcHead) -> Self {
		Self { actor_id, func_name, head }
	}

	/// Identity of the actor executing the handler.
	pub fn actor_id(&self) -> ActorId {
		self.actor_id
	}

	/// Function name as carried on the wire.
	pub fn func_name(&self) -> &str {
		&self.func_name
	}

	/// Socket the call arrived on. Zero for internal calls.
	pub fn socket_id(&self) -> u32 {
		self.head.socket_id
	}

	/// Actor that produced the call.
	pub fn origin_actor_id(&self) -> ActorId {
		ActorId::from_raw(self.head.call_id)
	}

	/// Routing metadata, with `socket_id` and `call_id` taken from the envelope.
	pub fn rpc_head(&self) -> &RpcHead {
		&self.head
	}
}
