//! Actor lifecycle and the single dispatch loop.
//!
//! An [`Actor`] is configured, has its calls registered, and is then started
//! exactly once. From that point one task owns the mailbox receiver and runs
//! every handler and timer callback in turn. [`ActorRef`] handles enqueue work
//! from any task.

use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use citadel_rpc::{CodecError, PostcardCodec, RpcArgs, RpcCodec, RpcHead};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::config::{ActorConfig, ArgMatching};
use crate::dispatch::Dispatcher;
use crate::envelope::Envelope;
use crate::error::SendError;
use crate::handler::Handler;
use crate::id::ActorId;
use crate::mailbox::{MailboxReceiver, MailboxSender, mailbox};
use crate::panic::panic_message;
use crate::registry::CallRegistry;
use crate::spawn::spawn_loop;
use crate::stats::{ActorStats, Counter, StatsSnapshot};
use crate::timer::{TimerCallback, TimerSource};

/// Lifecycle position of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
	/// Configured, accepting registrations, loop not yet spawned.
	Configured,
	/// Dispatch loop is running.
	Running,
	/// A destroy token is pending on the control queue.
	Stopping,
	/// Teardown has run. Sends are absorbed and the id is reset.
	Terminated,
}

impl fmt::Display for ActorState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Configured => "configured",
			Self::Running => "running",
			Self::Stopping => "stopping",
			Self::Terminated => "terminated",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
	Destroy,
}

struct ActorInner {
	name: String,
	id: AtomicI64,
	matching: ArgMatching,
	codec: Arc<dyn RpcCodec>,
	registry: RwLock<CallRegistry>,
	mailbox: MailboxSender<Envelope>,
	control: mpsc::Sender<Control>,
	timer: TimerSource,
	state: watch::Sender<ActorState>,
	stats: ActorStats,
	cancel: CancellationToken,
	torn_down: AtomicBool,
}

/// Receiving halves handed to the loop on start.
struct LoopParts {
	mailbox: MailboxReceiver<Envelope>,
	control: mpsc::Receiver<Control>,
}

impl ActorInner {
	fn id(&self) -> ActorId {
		ActorId::from_raw(self.id.load(Ordering::Acquire))
	}

	fn dispatcher(&self) -> Dispatcher<'_> {
		Dispatcher {
			actor: &self.name,
			actor_id: self.id(),
			codec: &*self.codec,
			registry: &self.registry,
			matching: self.matching,
			stats: &self.stats,
		}
	}

	/// Runs `f`, recovering and logging a panic instead of unwinding the loop.
	fn guard(&self, source: &'static str, f: impl FnOnce()) {
		if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
			self.stats.incr(Counter::Panics);
			tracing::error!(
				actor = %self.name,
				actor_id = %self.id(),
				source,
				panic = %panic_message(&*payload),
				"actor.panic"
			);
		}
	}

	/// Releases every resource the actor holds. Runs at most once.
	fn teardown(&self) {
		if self.torn_down.swap(true, Ordering::AcqRel) {
			return;
		}
		let discarded = self.mailbox.close();
		self.timer.disable();
		self.registry.write().clear();
		let id = self.id.swap(ActorId::NONE.get(), Ordering::AcqRel);
		self.stats.incr(Counter::Teardowns);
		self.state.send_replace(ActorState::Terminated);
		tracing::debug!(actor = %self.name, actor_id = id, discarded, "actor.teardown");
	}
}

async fn run_loop(inner: Arc<ActorInner>, parts: LoopParts) {
	let LoopParts { mailbox, mut control } = parts;
	let mut timer = inner.timer.driver();

	loop {
		tokio::select! {
			() = inner.cancel.cancelled() => {
				tracing::debug!(actor = %inner.name, actor_id = %inner.id(), "actor.cancelled");
				break;
			}
			ctrl = control.recv() => match ctrl {
				Some(Control::Destroy) => {
					tracing::debug!(actor = %inner.name, actor_id = %inner.id(), "actor.destroy");
					break;
				}
				None => break,
			},
			msg = mailbox.recv() => {
				let Some(envelope) = msg else {
					break;
				};
				inner.guard("call", || inner.dispatcher().deliver(envelope));
			}
			callback = timer.tick() => {
				if let Some(callback) = callback {
					inner.stats.incr(Counter::TimerFires);
					inner.guard("timer", || callback());
				}
			}
		}
	}

	control.close();
	inner.teardown();
}

/// Cloneable handle to an actor. Used by other actors and network tasks.
#[derive(Clone)]
pub struct ActorRef {
	inner: Arc<ActorInner>,
}

impl fmt::Debug for ActorRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActorRef")
			.field("name", &self.inner.name)
			.field("id", &self.id())
			.field("state", &self.state())
			.finish_non_exhaustive()
	}
}

impl ActorRef {
	/// Current identity. [`ActorId::NONE`] once terminated.
	pub fn id(&self) -> ActorId {
		self.inner.id()
	}

	/// Name given in the actor's config.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Current lifecycle position.
	pub fn state(&self) -> ActorState {
		*self.inner.state.borrow()
	}

	/// Copy of the actor's counters.
	pub fn stats(&self) -> StatsSnapshot {
		self.inner.stats.snapshot()
	}

	/// Envelopes queued and not yet dispatched.
	pub fn pending(&self) -> usize {
		self.inner.mailbox.len()
	}

	/// Mailbox capacity. Senders wait once this many envelopes are queued.
	pub fn capacity(&self) -> usize {
		self.inner.mailbox.capacity()
	}

	/// Period of the installed timer, if any.
	pub fn timer_period(&self) -> Option<Duration> {
		self.inner.timer.period()
	}

	/// Whether a handler is registered under any casing of `name`.
	pub fn has_call(&self, name: &str) -> bool {
		self.inner.registry.read().contains(name)
	}

	/// Enqueues an envelope, waiting while the mailbox is full.
	///
	/// Sending to a terminated actor is logged and absorbed.
	pub async fn send(&self, envelope: Envelope) {
		match self.inner.mailbox.send(envelope).await {
			Ok(()) => self.inner.stats.incr(Counter::Enqueued),
			Err((err, envelope)) => self.absorb(&err, &envelope),
		}
	}

	/// Enqueues without waiting. Reports a full or closed mailbox.
	pub fn try_send(&self, envelope: Envelope) -> Result<(), SendError> {
		match self.inner.mailbox.try_send(envelope) {
			Ok(()) => {
				self.inner.stats.incr(Counter::Enqueued);
				Ok(())
			}
			Err((err, envelope)) => {
				if matches!(err, SendError::Closed) {
					self.absorb(&err, &envelope);
				}
				Err(err)
			}
		}
	}

	fn absorb(&self, err: &SendError, envelope: &Envelope) {
		self.inner.stats.incr(Counter::SendClosed);
		tracing::warn!(
			actor = %self.inner.name,
			socket_id = envelope.socket_id,
			origin = %envelope.actor_id,
			error = %err,
			"actor.send.closed"
		);
	}

	/// Encodes an internal call to this actor. Origin is socket zero and this
	/// actor's own id.
	fn encode_msg(&self, func_name: &str, args: impl RpcArgs) -> Result<Envelope, CodecError> {
		let values = args.into_values()?;
		let buff = self.inner.codec.encode(func_name, &RpcHead::default(), &values)?;
		Ok(Envelope::new(0, self.id(), buff))
	}

	/// Encodes `func_name` with `args` and sends it to this actor.
	pub async fn send_msg(&self, func_name: &str, args: impl RpcArgs) -> Result<(), CodecError> {
		let envelope = self.encode_msg(func_name, args)?;
		self.send(envelope).await;
		Ok(())
	}

	/// Non-blocking [`send_msg`](Self::send_msg), usable from inside handlers.
	pub fn try_send_msg(&self, func_name: &str, args: impl RpcArgs) -> Result<(), SendError> {
		let envelope = self.encode_msg(func_name, args)?;
		self.try_send(envelope)
	}

	/// Network ingress. Enqueues `buff` only if its head names a registered call.
	pub async fn packet_func(&self, socket_id: u32, buff: impl Into<Bytes>) -> bool {
		let buff = buff.into();
		let admitted = match self.inner.codec.decode_head(&buff) {
			Ok(head) => self.inner.registry.read().contains(&head.func_name),
			Err(err) => {
				tracing::debug!(actor = %self.inner.name, socket_id, error = %err, "actor.packet.undecodable");
				false
			}
		};
		if !admitted {
			self.inner.stats.incr(Counter::Rejected);
			return false;
		}
		self.send(Envelope::from_socket(socket_id, buff)).await;
		true
	}

	/// Requests shutdown through the control queue.
	///
	/// The queue holds one token, so a second overlapping stop waits until the
	/// loop consumes the first.
	pub async fn stop(&self) {
		self.mark_stopping();
		if self.inner.control.send(Control::Destroy).await.is_err() {
			tracing::trace!(actor = %self.inner.name, "actor.stop.after_teardown");
		}
	}

	/// Non-blocking [`stop`](Self::stop), usable from inside handlers and
	/// timer callbacks.
	///
	/// Returns `false` if a destroy token is already pending or the actor has
	/// terminated.
	pub fn try_stop(&self) -> bool {
		match self.inner.control.try_send(Control::Destroy) {
			Ok(()) => {
				self.mark_stopping();
				true
			}
			Err(mpsc::error::TrySendError::Full(_)) => false,
			Err(mpsc::error::TrySendError::Closed(_)) => {
				tracing::trace!(actor = %self.inner.name, "actor.stop.after_teardown");
				false
			}
		}
	}

	fn mark_stopping(&self) {
		self.inner.state.send_if_modified(|state| {
			if *state == ActorState::Running {
				*state = ActorState::Stopping;
				true
			} else {
				false
			}
		});
	}

	/// Installs a periodic callback on the dispatch loop, replacing any
	/// previous one. The first call fires one `period` from now.
	///
	/// # Panics
	///
	/// Panics if `period` is zero.
	pub fn register_timer<F>(&self, period: Duration, callback: F)
	where
		F: Fn() + Send + Sync + 'static,
	{
		assert!(!period.is_zero(), "timer period must be > 0");
		let callback: TimerCallback = Arc::new(callback);
		self.inner.timer.replace(period, callback);
		tracing::debug!(actor = %self.inner.name, ?period, "actor.timer.register");
	}

	/// Removes the installed timer. A no-op when none is installed.
	pub fn clear_timer(&self) {
		self.inner.timer.disable();
	}

	/// Resolves once teardown has run.
	pub async fn wait_stopped(&self) {
		let mut rx = self.inner.state.subscribe();
		let _ = rx.wait_for(|state| *state == ActorState::Terminated).await;
	}

	/// Like [`wait_stopped`](Self::wait_stopped) with a deadline. Returns
	/// whether the actor terminated in time.
	pub async fn wait_stopped_timeout(&self, timeout: Duration) -> bool {
		tokio::time::timeout(timeout, self.wait_stopped()).await.is_ok()
	}
}

/// Owning side of an actor. Registration and start go through here.
///
/// Dropping the owner cancels the dispatch loop. Teardown still runs once.
pub struct Actor {
	handle: ActorRef,
	parts: Option<LoopParts>,
}

impl Actor {
	/// Configures an actor with the postcard codec.
	pub fn configure(config: ActorConfig) -> Self {
		Self::with_codec(config, Arc::new(PostcardCodec::new()))
	}

	/// Configures a default-named actor with the given mailbox capacity.
	pub fn new(capacity: usize) -> Self {
		Self::configure(ActorConfig::default().with_capacity(capacity))
	}

	/// Configures an actor with a custom codec.
	///
	/// # Panics
	///
	/// Panics if the mailbox capacity is zero.
	pub fn with_codec(config: ActorConfig, codec: Arc<dyn RpcCodec>) -> Self {
		let (mailbox_tx, mailbox_rx) = mailbox(config.mailbox_capacity);
		let (control_tx, control_rx) = mpsc::channel(1);
		let (state, _) = watch::channel(ActorState::Configured);
		let id = ActorId::allocate();

		tracing::debug!(actor = %config.name, actor_id = %id, capacity = config.mailbox_capacity, matching = ?config.arg_matching, "actor.configure");

		let inner = Arc::new(ActorInner {
			name: config.name,
			id: AtomicI64::new(id.get()),
			matching: config.arg_matching,
			codec,
			registry: RwLock::new(CallRegistry::new()),
			mailbox: mailbox_tx,
			control: control_tx,
			timer: TimerSource::new(),
			state,
			stats: ActorStats::default(),
			cancel: CancellationToken::new(),
			torn_down: AtomicBool::new(false),
		});

		Self {
			handle: ActorRef { inner },
			parts: Some(LoopParts {
				mailbox: mailbox_rx,
				control: control_rx,
			}),
		}
	}

	/// Registers a handler under a case-insensitive name.
	///
	/// # Panics
	///
	/// Panics if the name is already registered under any casing, or if the
	/// actor has been started. Both are configuration errors.
	pub fn register_call<Args, H>(&mut self, name: &str, handler: H)
	where
		H: Handler<Args>,
	{
		assert!(self.parts.is_some(), "actor [{}] registers call [{name}] after start", self.handle.inner.name);
		let registered = self.handle.inner.registry.write().register(name, handler);
		if let Err(err) = registered {
			panic!("{err}");
		}
	}

	/// Spawns the dispatch loop. Returns `false` if it was already started.
	///
	/// Uses the current tokio runtime, or a shared fallback runtime when called
	/// from outside one.
	pub fn start(&mut self) -> bool {
		let Some(parts) = self.parts.take() else {
			return false;
		};
		let inner = Arc::clone(&self.handle.inner);
		// A stop issued before start leaves its token queued.
		let state = if parts.control.is_empty() { ActorState::Running } else { ActorState::Stopping };
		inner.state.send_replace(state);
		tracing::debug!(actor = %inner.name, actor_id = %inner.id(), calls = inner.registry.read().len(), "actor.start");
		spawn_loop(&inner.name, inner.id(), run_loop(Arc::clone(&inner), parts));
		true
	}

	/// Returns a cloneable handle.
	pub fn handle(&self) -> ActorRef {
		self.handle.clone()
	}
}

impl Deref for Actor {
	type Target = ActorRef;

	fn deref(&self) -> &ActorRef {
		&self.handle
	}
}

impl fmt::Debug for Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Actor")
			.field("handle", &self.handle)
			.field("started", &self.parts.is_none())
			.finish()
	}
}

impl Drop for Actor {
	fn drop(&mut self) {
		self.handle.inner.cancel.cancel();
		if self.parts.take().is_some() {
			self.handle.inner.teardown();
		}
	}
}
