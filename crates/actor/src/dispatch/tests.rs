use std::sync::Arc;

use citadel_rpc::{Msg, PostcardCodec, RpcArgs, RpcHead, RpcValue};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegisterRequest {
	account_name: String,
	password: String,
}

struct Fixture {
	registry: RwLock<CallRegistry>,
	stats: ActorStats,
	matching: ArgMatching,
}

impl Fixture {
	fn new(matching: ArgMatching) -> Self {
		Self {
			registry: RwLock::new(CallRegistry::new()),
			stats: ActorStats::default(),
			matching,
		}
	}

	fn dispatcher(&self) -> Dispatcher<'_> {
		Dispatcher {
			actor: "test",
			actor_id: ActorId::from_raw(77),
			codec: &PostcardCodec,
			registry: &self.registry,
			matching: self.matching,
			stats: &self.stats,
		}
	}
}

fn frame(name: &str, args: impl RpcArgs) -> Envelope {
	let head = RpcHead {
		id: 500,
		..RpcHead::default()
	};
	let args = args.into_values().expect("args");
	let buff = PostcardCodec.encode(name, &head, &args).expect("encode");
	Envelope::new(12, ActorId::from_raw(3), buff)
}

#[test]
fn matching_call_runs_with_envelope_context() {
	let fx = Fixture::new(ArgMatching::Exact);
	let seen = Arc::new(Mutex::new(None));
	let sink = Arc::clone(&seen);
	fx.registry
		.write()
		.register("W_A_CreatePlayer", move |ctx: &CallContext, account: i64, name: String| {
			*sink.lock() = Some((ctx.clone(), account, name));
		})
		.expect("register");

	fx.dispatcher().deliver(frame("w_a_createplayer", (9i64, String::from("hero"))));

	let (ctx, account, name) = seen.lock().take().expect("handler ran");
	assert_eq!((account, name.as_str()), (9, "hero"));
	assert_eq!(ctx.actor_id(), ActorId::from_raw(77));
	assert_eq!(ctx.socket_id(), 12);
	assert_eq!(ctx.origin_actor_id(), ActorId::from_raw(3));
	assert_eq!(ctx.rpc_head().id, 500);
	assert_eq!(ctx.func_name(), "w_a_createplayer");
	assert_eq!(fx.stats.snapshot().dispatched, 1);
}

#[test]
fn arity_mismatch_never_runs_handler() {
	let fx = Fixture::new(ArgMatching::Exact);
	let calls = Arc::new(Mutex::new(0));
	let sink = Arc::clone(&calls);
	fx.registry
		.write()
		.register("W_A_DeletePlayer", move |_ctx: &CallContext, _account: i64, _player: i64| {
			*sink.lock() += 1;
		})
		.expect("register");

	fx.dispatcher().deliver(frame("W_A_DeletePlayer", (1i64,)));
	fx.dispatcher().deliver(frame("W_A_DeletePlayer", (1i64, 2i64, 3i64)));

	assert_eq!(*calls.lock(), 0);
	let stats = fx.stats.snapshot();
	assert_eq!(stats.dropped_arity, 2);
	assert_eq!(stats.dispatched, 0);
}

#[test]
fn exact_matching_rejects_other_integer_widths() {
	let fx = Fixture::new(ArgMatching::Exact);
	let calls = Arc::new(Mutex::new(0));
	let sink = Arc::clone(&calls);
	fx.registry
		.write()
		.register("Account_Login", move |_ctx: &CallContext, _account: i64| {
			*sink.lock() += 1;
		})
		.expect("register");

	fx.dispatcher().deliver(frame("Account_Login", (5i32,)));

	assert_eq!(*calls.lock(), 0);
	assert_eq!(fx.stats.snapshot().dropped_kind, 1);
}

#[test]
fn coarse_matching_accepts_other_integer_widths() {
	let fx = Fixture::new(ArgMatching::Coarse);
	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	fx.registry
		.write()
		.register("Account_Login", move |_ctx: &CallContext, account: i64, sex: i8| {
			sink.lock().push((account, sex));
		})
		.expect("register");

	fx.dispatcher().deliver(frame("Account_Login", (5i32, 1i64)));
	// Fits the family but not the width: dropped during conversion.
	fx.dispatcher().deliver(frame("Account_Login", (5i32, 300i64)));
	// Different family entirely.
	fx.dispatcher().deliver(frame("Account_Login", (String::from("5"), 1i8)));

	assert_eq!(*seen.lock(), vec![(5, 1)]);
	assert_eq!(fx.stats.snapshot().dropped_kind, 2);
}

#[test]
fn struct_arguments_decode_into_message_types() {
	let fx = Fixture::new(ArgMatching::Exact);
	let seen = Arc::new(Mutex::new(None));
	let sink = Arc::clone(&seen);
	fx.registry
		.write()
		.register("C_A_RegisterRequest", move |_ctx: &CallContext, req: Msg<RegisterRequest>| {
			*sink.lock() = Some(req.into_inner());
		})
		.expect("register");

	let req = RegisterRequest {
		account_name: "ann".into(),
		password: "secret".into(),
	};
	fx.dispatcher().deliver(frame("C_A_RegisterRequest", (Msg(req.clone()),)));

	assert_eq!(seen.lock().take(), Some(req));
}

#[test]
fn unknown_and_garbage_frames_are_dropped() {
	let fx = Fixture::new(ArgMatching::Exact);
	fx.dispatcher().deliver(frame("nobody_home", ()));
	fx.dispatcher().deliver(Envelope::from_socket(1, vec![0xff, 0xff, 0xff]));

	let stats = fx.stats.snapshot();
	assert_eq!(stats.dropped_unknown, 1);
	assert_eq!(stats.dropped_decode, 1);
}

#[test]
fn zero_arity_handler_runs_without_arguments() {
	let fx = Fixture::new(ArgMatching::Exact);
	let calls = Arc::new(Mutex::new(0));
	let sink = Arc::clone(&calls);
	fx.registry
		.write()
		.register("ping", move |_ctx: &CallContext| {
			*sink.lock() += 1;
		})
		.expect("register");

	fx.dispatcher().deliver(frame("PING", ()));
	fx.dispatcher().deliver(frame("PING", vec![RpcValue::Bool(true)]));

	assert_eq!(*calls.lock(), 1);
	assert_eq!(fx.stats.snapshot().dropped_arity, 1);
}

#[test]
fn args_fit_compares_by_matching_mode() {
	let sig = Signature::new(vec![<i64 as citadel_rpc::RpcParam>::param()]);
	assert!(args_fit(&sig, &[RpcValue::I64(1)], ArgMatching::Exact));
	assert!(args_fit(&sig, &[RpcValue::U64(1)], ArgMatching::Coarse));
	assert!(!args_fit(&sig, &[RpcValue::U64(1)], ArgMatching::Exact));
	assert!(!args_fit(&sig, &[RpcValue::F64(1.0)], ArgMatching::Coarse));
	assert!(args_fit(&sig, &[RpcValue::I16(1)], ArgMatching::Coarse));
	assert!(!args_fit(&sig, &[RpcValue::I16(1)], ArgMatching::Exact));
}
