//! Typed handler closures behind the string-keyed registry.

use citadel_rpc::{CodecError, RpcParam, RpcValue, Signature};

use crate::context::CallContext;

/// A callable that can be registered under a function name.
///
/// Implemented for `Fn(&CallContext, A1, .., An)` closures with up to eight
/// [`RpcParam`] arguments. The `Args` parameter only disambiguates arities.
pub trait Handler<Args>: Send + Sync + 'static {
	/// Declared parameter shape.
	fn signature() -> Signature
	where
		Self: Sized;

	/// Converts `args` to the declared types and runs the handler.
	fn call(&self, ctx: &CallContext, args: Vec<RpcValue>) -> Result<(), CodecError>;
}

macro_rules! count {
	() => { 0usize };
	($head:ident $(, $tail:ident)*) => { 1usize + count!($($tail),*) };
}

macro_rules! impl_handler {
	($($arg:ident),*) => {
		impl<F, $($arg),*> Handler<($($arg,)*)> for F
		where
			F: Fn(&CallContext, $($arg),*) + Send + Sync + 'static,
			$($arg: RpcParam,)*
		{
			fn signature() -> Signature {
				Signature::new(vec![$($arg::param()),*])
			}

			#[allow(non_snake_case)]
			fn call(&self, ctx: &CallContext, args: Vec<RpcValue>) -> Result<(), CodecError> {
				const ARITY: usize = count!($($arg),*);
				let got = args.len();
				if got != ARITY {
					return Err(CodecError::ArgumentCount { expected: ARITY, got });
				}
				#[allow(unused_mut, unused_variables)]
				let mut args = args.into_iter();
				$(
					let Some(value) = args.next() else {
						return Err(CodecError::ArgumentCount { expected: ARITY, got });
					};
					let $arg = $arg::from_value(value)?;
				)*
				(self)(ctx, $($arg),*);
				Ok(())
			}
		}
	};
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicI64, Ordering};

	use citadel_rpc::{RpcHead, ValueKind};

	use super::*;
	use crate::id::ActorId;

	fn signature_of<Args, H: Handler<Args>>(_h: &H) -> Signature {
		H::signature()
	}

	fn ctx() -> CallContext {
		CallContext::new(ActorId::from_raw(1), "test".into(), RpcHead::default())
	}

	#[test]
	fn signature_follows_parameter_types() {
		let h = |_ctx: &CallContext, _id: i64, _name: String, _sex: i32| {};
		let sig = signature_of(&h);
		let kinds: Vec<_> = sig.params().iter().map(|p| p.kind).collect();
		assert_eq!(kinds, vec![ValueKind::I64, ValueKind::Str, ValueKind::I32]);
	}

	#[test]
	fn call_binds_arguments_in_order() {
		let seen = Arc::new(AtomicI64::new(0));
		let sink = Arc::clone(&seen);
		let h = move |_ctx: &CallContext, a: i64, b: i64| sink.store(a * 10 + b, Ordering::SeqCst);

		Handler::call(&h, &ctx(), vec![RpcValue::I64(4), RpcValue::I64(2)]).expect("call");
		assert_eq!(seen.load(Ordering::SeqCst), 42);
	}

	#[test]
	fn call_rejects_wrong_count_without_running() {
		let seen = Arc::new(AtomicI64::new(0));
		let sink = Arc::clone(&seen);
		let h = move |_ctx: &CallContext, a: i64| sink.store(a, Ordering::SeqCst);

		let err = Handler::call(&h, &ctx(), vec![]).expect_err("missing argument");
		assert!(matches!(err, CodecError::ArgumentCount { expected: 1, got: 0 }));
		assert_eq!(seen.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn zero_arity_handler_runs_with_context() {
		let seen = Arc::new(AtomicI64::new(0));
		let sink = Arc::clone(&seen);
		let h = move |ctx: &CallContext| sink.store(ctx.actor_id().get(), Ordering::SeqCst);
		assert!(signature_of(&h).params().is_empty());
		Handler::call(&h, &ctx(), Vec::new()).expect("call");
		assert_eq!(seen.load(Ordering::SeqCst), 1);
	}
}
