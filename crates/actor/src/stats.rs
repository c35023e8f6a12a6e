use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by one actor. Every drop counted here is also logged.
#[derive(Debug, Default)]
pub(crate) struct ActorStats {
	enqueued: AtomicU64,
	rejected: AtomicU64,
	send_closed: AtomicU64,
	dispatched: AtomicU64,
	dropped_unknown: AtomicU64,
	dropped_decode: AtomicU64,
	dropped_arity: AtomicU64,
	dropped_kind: AtomicU64,
	panics: AtomicU64,
	timer_fires: AtomicU64,
	teardowns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
	Enqueued,
	Rejected,
	SendClosed,
	Dispatched,
	DroppedUnknown,
	DroppedDecode,
	DroppedArity,
	DroppedKind,
	Panics,
	TimerFires,
	Teardowns,
}

impl ActorStats {
	pub fn incr(&self, counter: Counter) {
		let slot = match counter {
			Counter::Enqueued => &self.enqueued,
			Counter::Rejected => &self.rejected,
			Counter::SendClosed => &self.send_closed,
			Counter::Dispatched => &self.dispatched,
			Counter::DroppedUnknown => &self.dropped_unknown,
			Counter::DroppedDecode => &self.dropped_decode,
			Counter::DroppedArity => &self.dropped_arity,
			Counter::DroppedKind => &self.dropped_kind,
			Counter::Panics => &self.panics,
			Counter::TimerFires => &self.timer_fires,
			Counter::Teardowns => &self.teardowns,
		};
		slot.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> StatsSnapshot {
		let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
		StatsSnapshot {
			enqueued: load(&self.enqueued),
			rejected: load(&self.rejected),
			send_closed: load(&self.send_closed),
			dispatched: load(&self.dispatched),
			dropped_unknown: load(&self.dropped_unknown),
			dropped_decode: load(&self.dropped_decode),
			dropped_arity: load(&self.dropped_arity),
			dropped_kind: load(&self.dropped_kind),
			panics: load(&self.panics),
			timer_fires: load(&self.timer_fires),
			teardowns: load(&self.teardowns),
		}
	}
}

/// Point-in-time copy of an actor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
	/// Envelopes accepted into the mailbox.
	pub enqueued: u64,
	/// Network frames refused by `packet_func` admission.
	pub rejected: u64,
	/// Sends absorbed because the actor had terminated.
	pub send_closed: u64,
	/// Handler invocations that returned normally.
	pub dispatched: u64,
	/// Calls naming no registered handler.
	pub dropped_unknown: u64,
	/// Frames the codec could not decode.
	pub dropped_decode: u64,
	/// Calls whose argument count differs from the declared arity.
	pub dropped_arity: u64,
	/// Calls whose argument kinds or values do not fit the declared parameters.
	pub dropped_kind: u64,
	/// Panics recovered at the loop boundary.
	pub panics: u64,
	/// Timer callbacks invoked, including ones that panicked.
	pub timer_fires: u64,
	/// Teardowns run. Never more than one.
	pub teardowns: u64,
}

impl StatsSnapshot {
	/// All messages dropped at dispatch time.
	pub fn dropped(&self) -> u64 {
		self.dropped_unknown + self.dropped_decode + self.dropped_arity + self.dropped_kind
	}
}
