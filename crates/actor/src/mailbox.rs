//! Bounded FIFO mailbox with blocking backpressure.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::SendError;

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
	notify_send: Notify,
}

/// Multi-producer mailbox sender.
pub(crate) struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver, owned by the dispatch loop.
pub(crate) struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

/// Creates a bounded mailbox.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub(crate) fn mailbox<T>(capacity: usize) -> (MailboxSender<T>, MailboxReceiver<T>) {
	assert!(capacity > 0, "mailbox capacity must be > 0");
	let inner = Arc::new(MailboxInner {
		capacity,
		state: Mutex::new(MailboxState {
			queue: VecDeque::with_capacity(capacity.min(1024)),
			closed: false,
		}),
		notify_recv: Notify::new(),
		notify_send: Notify::new(),
	});
	(
		MailboxSender {
			inner: Arc::clone(&inner),
		},
		MailboxReceiver { inner },
	)
}

impl<T> MailboxSender<T> {
	/// Enqueues, waiting for capacity while the mailbox is full.
	///
	/// Returns the message back if the mailbox is closed before it fits.
	pub async fn send(&self, msg: T) -> Result<(), (SendError, T)> {
		loop {
			// Register before checking capacity so a pop between the check
			// and the await is not lost.
			let notified = self.inner.notify_send.notified();
			{
				let mut state = self.inner.state.lock();
				if state.closed {
					return Err((SendError::Closed, msg));
				}
				if state.queue.len() < self.inner.capacity {
					state.queue.push_back(msg);
					drop(state);
					self.inner.notify_recv.notify_one();
					return Ok(());
				}
			}
			notified.await;
		}
	}

	/// Non-blocking enqueue.
	pub fn try_send(&self, msg: T) -> Result<(), (SendError, T)> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err((SendError::Closed, msg));
		}
		if state.queue.len() >= self.inner.capacity {
			return Err((SendError::Full, msg));
		}
		state.queue.push_back(msg);
		drop(state);
		self.inner.notify_recv.notify_one();
		Ok(())
	}

	/// Closes the mailbox and discards anything still queued.
	///
	/// Blocked senders and the receiver wake up and observe closure. Returns
	/// the number of discarded messages.
	pub fn close(&self) -> usize {
		let discarded = {
			let mut state = self.inner.state.lock();
			state.closed = true;
			let n = state.queue.len();
			state.queue.clear();
			n
		};
		self.inner.notify_recv.notify_waiters();
		self.inner.notify_send.notify_waiters();
		discarded
	}

	pub fn len(&self) -> usize {
		self.inner.state.lock().queue.len()
	}

	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}
}

impl<T> MailboxReceiver<T> {
	/// Receives the oldest message. Returns `None` once the mailbox is closed.
	pub async fn recv(&self) -> Option<T> {
		loop {
			let notified = self.inner.notify_recv.notified();
			{
				let mut state = self.inner.state.lock();
				if let Some(msg) = state.queue.pop_front() {
					drop(state);
					self.inner.notify_send.notify_one();
					return Some(msg);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test]
	async fn try_send_returns_full_at_capacity() {
		let (tx, rx) = mailbox(3);

		assert!(tx.try_send(1u32).is_ok());
		assert!(tx.try_send(2).is_ok());
		assert!(tx.try_send(3).is_ok());
		assert!(matches!(tx.try_send(4), Err((SendError::Full, 4))));
		assert_eq!(tx.len(), 3);

		assert_eq!(rx.recv().await, Some(1));
		assert_eq!(rx.recv().await, Some(2));
		assert_eq!(rx.recv().await, Some(3));
	}

	#[tokio::test]
	async fn send_blocks_until_capacity_freed() {
		let (tx, rx) = mailbox(2);
		let _ = tx.send(1u32).await;
		let _ = tx.send(2).await;

		let tx2 = tx.clone();
		let send_task = tokio::spawn(async move { tx2.send(3).await });

		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(!send_task.is_finished(), "send must wait while the mailbox is full");

		assert_eq!(rx.recv().await, Some(1));

		let result = tokio::time::timeout(Duration::from_millis(200), send_task)
			.await
			.expect("send should unblock after pop")
			.expect("send task");
		assert!(result.is_ok());

		assert_eq!(rx.recv().await, Some(2));
		assert_eq!(rx.recv().await, Some(3));
	}

	#[tokio::test]
	async fn close_discards_queue_and_wakes_blocked_sender() {
		let (tx, rx) = mailbox(1);
		let _ = tx.send(1u32).await;

		let tx2 = tx.clone();
		let blocked = tokio::spawn(async move { tx2.send(2).await });
		tokio::time::sleep(Duration::from_millis(10)).await;

		assert_eq!(tx.close(), 1);
		let result = tokio::time::timeout(Duration::from_millis(200), blocked)
			.await
			.expect("closed mailbox should release blocked sender")
			.expect("send task");
		assert!(matches!(result, Err((SendError::Closed, 2))));
		assert_eq!(rx.recv().await, None);
		assert!(matches!(tx.try_send(3), Err((SendError::Closed, 3))));
	}

	#[tokio::test]
	async fn recv_waits_for_a_message() {
		let (tx, rx) = mailbox(4);
		let recv_task = tokio::spawn(async move { rx.recv().await });
		tokio::time::sleep(Duration::from_millis(10)).await;
		let _ = tx.try_send(7u32);
		let got = tokio::time::timeout(Duration::from_millis(200), recv_task)
			.await
			.expect("recv should wake")
			.expect("recv task");
		assert_eq!(got, Some(7));
	}
}
