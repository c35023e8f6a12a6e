//! Replaceable periodic wake source.
//!
//! The owning side ([`TimerSource`]) publishes the current cadence through a
//! watch channel. The dispatch loop holds the only [`TimerDriver`], which
//! rebuilds its interval whenever the cadence changes. The old interval is
//! dropped before the new one exists, so two cadences never overlap.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Timer callback. Runs on the dispatch loop, serialized with handlers.
pub type TimerCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
struct TimerSpec {
	period: Option<Duration>,
	callback: Option<TimerCallback>,
}

impl fmt::Debug for TimerSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TimerSpec")
			.field("period", &self.period)
			.field("callback", &self.callback.is_some())
			.finish()
	}
}

/// Publishing side of an actor's timer. Disabled until a cadence is installed.
#[derive(Debug)]
pub(crate) struct TimerSource {
	tx: watch::Sender<TimerSpec>,
}

impl TimerSource {
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(TimerSpec::default());
		Self { tx }
	}

	/// Installs a new cadence, replacing the previous one.
	pub fn replace(&self, period: Duration, callback: TimerCallback) {
		self.tx.send_replace(TimerSpec {
			period: Some(period),
			callback: Some(callback),
		});
	}

	/// Stops firing. The callback slot is emptied.
	pub fn disable(&self) {
		self.tx.send_replace(TimerSpec::default());
	}

	pub fn period(&self) -> Option<Duration> {
		self.tx.borrow().period
	}

	/// Creates the loop-side driver from the current cadence.
	pub fn driver(&self) -> TimerDriver {
		let mut rx = self.tx.subscribe();
		let spec = rx.borrow_and_update().clone();
		let mut driver = TimerDriver {
			rx,
			interval: None,
			callback: None,
		};
		driver.install(spec);
		driver
	}
}

/// Loop-side view of the timer.
pub(crate) struct TimerDriver {
	rx: watch::Receiver<TimerSpec>,
	interval: Option<Interval>,
	callback: Option<TimerCallback>,
}

impl TimerDriver {
	fn install(&mut self, spec: TimerSpec) {
		self.interval = None;
		self.callback = spec.callback;
		if let Some(period) = spec.period {
			let mut interval = tokio::time::interval_at(Instant::now() + period, period);
			interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
			self.interval = Some(interval);
		}
	}

	fn reinstall(&mut self) {
		let spec = self.rx.borrow_and_update().clone();
		tracing::trace!(period = ?spec.period, "actor.timer.replace");
		self.install(spec);
	}

	/// Resolves on the next tick of the current cadence with the callback to run.
	///
	/// Never resolves while disabled. A cadence change observed before a tick
	/// is delivered discards that tick. Cancel safe.
	pub async fn tick(&mut self) -> Option<TimerCallback> {
		loop {
			let ticked = match self.interval.as_mut() {
				None => {
					next_change(&mut self.rx).await;
					false
				}
				Some(interval) => tokio::select! {
					() = next_change(&mut self.rx) => false,
					_ = interval.tick() => !self.rx.has_changed().unwrap_or(false),
				},
			};
			if ticked {
				return self.callback.clone();
			}
			self.reinstall();
		}
	}
}

/// Waits for a cadence change. Pends forever once the source is gone.
async fn next_change(rx: &mut watch::Receiver<TimerSpec>) {
	if rx.changed().await.is_err() {
		std::future::pending::<()>().await;
	}
}
