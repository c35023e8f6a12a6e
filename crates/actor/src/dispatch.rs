//! Name-based dynamic dispatch of one envelope.
//!
//! Dispatch order for one frame:
//! 1. head decode, registry lookup (unknown names are dropped quietly)
//! 2. body decode shaped by the handler's signature
//! 3. arity check, then per-argument kind check
//! 4. typed conversion and invocation
//!
//! Any failure drops the whole call before the handler body runs.

use citadel_rpc::{RpcCodec, RpcValue, Signature};
use parking_lot::RwLock;

use crate::config::ArgMatching;
use crate::context::CallContext;
use crate::envelope::Envelope;
use crate::error::DispatchError;
use crate::id::ActorId;
use crate::registry::CallRegistry;
use crate::stats::{ActorStats, Counter};

/// Borrowed view of everything one dispatch needs.
pub(crate) struct Dispatcher<'a> {
	pub actor: &'a str,
	pub actor_id: ActorId,
	pub codec: &'a dyn RpcCodec,
	pub registry: &'a RwLock<CallRegistry>,
	pub matching: ArgMatching,
	pub stats: &'a ActorStats,
}

impl Dispatcher<'_> {
	/// Decodes and runs one envelope, logging and counting any drop.
	///
	/// Handler panics are not caught here; the loop boundary recovers them.
	pub fn deliver(&self, envelope: Envelope) {
		let func = match self.codec.decode_head(&envelope.buff) {
			Ok(head) => head.func_name,
			Err(err) => {
				self.stats.incr(Counter::DroppedDecode);
				tracing::warn!(actor = self.actor, actor_id = %self.actor_id, socket_id = envelope.socket_id, error = %err, "actor.call.undecodable");
				return;
			}
		};

		match self.call(&func, &envelope) {
			Ok(()) => {}
			Err(DispatchError::Unknown) => {
				self.stats.incr(Counter::DroppedUnknown);
				tracing::debug!(actor = self.actor, func = %func, "actor.call.unknown");
			}
			Err(err) => {
				let counter = match err {
					DispatchError::Arity { .. } => Counter::DroppedArity,
					DispatchError::Kind { .. } | DispatchError::Convert { .. } => Counter::DroppedKind,
					DispatchError::Decode(_) | DispatchError::Unknown => Counter::DroppedDecode,
				};
				self.stats.incr(counter);
				tracing::warn!(actor = self.actor, actor_id = %self.actor_id, func = %func, error = %err, "actor.call.dropped");
			}
		}
	}

	fn call(&self, func: &str, envelope: &Envelope) -> Result<(), DispatchError> {
		// Clone the descriptor out so no lock is held while the handler runs.
		let Some(descriptor) = self.registry.read().find(func).cloned() else {
			return Err(DispatchError::Unknown);
		};
		let declared = descriptor.signature();

		let packet = self.codec.decode_body(&envelope.buff, declared).map_err(DispatchError::Decode)?;

		let mut head = packet.head;
		head.socket_id = envelope.socket_id;
		head.call_id = envelope.actor_id.get();
		let ctx = CallContext::new(self.actor_id, packet.func_name, head);

		if declared.arity() != packet.args.len() {
			return Err(DispatchError::Arity {
				declared: declared.clone(),
				received: Signature::describe_args(&packet.args),
			});
		}
		if !args_fit(declared, &packet.args, self.matching) {
			return Err(DispatchError::Kind {
				declared: declared.clone(),
				received: Signature::describe_args(&packet.args),
			});
		}

		descriptor.invoke(&ctx, packet.args).map_err(|source| DispatchError::Convert {
			declared: declared.clone(),
			source,
		})?;
		self.stats.incr(Counter::Dispatched);
		Ok(())
	}
}

/// Checks every argument kind against the declared parameter kinds.
pub(crate) fn args_fit(declared: &Signature, args: &[RpcValue], matching: ArgMatching) -> bool {
	declared.params().iter().zip(args).all(|(param, arg)| match matching {
		ArgMatching::Exact => param.kind == arg.kind(),
		ArgMatching::Coarse => param.kind.family() == arg.kind().family(),
	})
}

#[cfg(test)]
mod tests;
