use std::future::Future;
use std::sync::OnceLock;

use crate::id::ActorId;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("citadel-actor-global")
			.build()
			.expect("failed to build citadel-actor global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns an actor dispatch loop on the current runtime, or on a shared
/// fallback runtime when called from outside one.
pub(crate) fn spawn_loop<F>(actor: &str, actor_id: ActorId, fut: F)
where
	F: Future<Output = ()> + Send + 'static,
{
	tracing::trace!(actor, %actor_id, "actor.spawn");
	drop(runtime_handle().spawn(fut));
}
