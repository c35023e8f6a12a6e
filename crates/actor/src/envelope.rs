use bytes::Bytes;

use crate::id::ActorId;

/// One queued unit of work, consumed exactly once by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
	/// Socket the payload arrived on. Zero marks an internal call.
	pub socket_id: u32,
	/// Actor that produced the payload.
	pub actor_id: ActorId,
	/// Encoded call frame.
	pub buff: Bytes,
}

impl Envelope {
	/// Envelope with an explicit origin socket and actor.
	pub fn new(socket_id: u32, actor_id: ActorId, buff: impl Into<Bytes>) -> Self {
		Self {
			socket_id,
			actor_id,
			buff: buff.into(),
		}
	}

	/// Envelope for a frame received from the network.
	pub fn from_socket(socket_id: u32, buff: impl Into<Bytes>) -> Self {
		Self::new(socket_id, ActorId::NONE, buff)
	}

	/// Whether the payload was produced inside the process rather than read
	/// from a socket.
	pub const fn is_internal(&self) -> bool {
		self.socket_id == 0
	}
}
