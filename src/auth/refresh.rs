//! Single-flight coordination for bearer-token refreshes.
//!
//! At most one token exchange is in flight at any time. The first caller to
//! observe a missing/stale credential becomes the leader and performs the
//! exchange; every caller arriving while it runs becomes a follower and
//! subscribes to the leader's outcome over a watch channel instead of issuing
//! its own exchange. Followers wait up to a configured bound; an expired wait
//! lets the follower proceed so a stalled exchange cannot wedge every caller.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::future::Future;
// crates.io
use tokio::{sync::watch, time};
// self
use crate::_prelude::*;

/// Outcome published to followers once the leading exchange settles.
///
/// `None` until the leader finishes; the error side is shared so every
/// follower can surface the same failure.
type RefreshOutcome = Option<std::result::Result<(), Arc<Error>>>;

enum Role {
	Follower(watch::Receiver<RefreshOutcome>),
	Leader(watch::Sender<RefreshOutcome>),
}

/// Coalesces concurrent refresh attempts into a single upstream exchange.
#[derive(Debug)]
pub struct RefreshCoordinator {
	inflight: Mutex<Option<watch::Receiver<RefreshOutcome>>>,
	metrics: RefreshMetrics,
	wait: Duration,
}
impl RefreshCoordinator {
	/// Creates a coordinator whose followers wait up to `wait` for a leading
	/// exchange to settle.
	pub fn new(wait: Duration) -> Self {
		Self { inflight: Mutex::new(None), metrics: RefreshMetrics::default(), wait }
	}

	/// Returns the counters recorded across refresh attempts.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Runs `exchange` unless one is already in flight, in which case the
	/// in-flight outcome is awaited instead.
	///
	/// The follower's `exchange` future is dropped unpolled; exactly one
	/// exchange reaches the upstream endpoint per flight.
	pub async fn run<F>(&self, exchange: F) -> Result<()>
	where
		F: Future<Output = Result<()>>,
	{
		let role = {
			let mut slot = self.inflight.lock();

			match slot.as_ref() {
				Some(receiver) => Role::Follower(receiver.clone()),
				None => {
					let (sender, receiver) = watch::channel(None);

					*slot = Some(receiver);

					Role::Leader(sender)
				},
			}
		};

		match role {
			Role::Leader(sender) => self.lead(sender, exchange).await,
			Role::Follower(receiver) => self.follow(receiver).await,
		}
	}

	async fn lead<F>(&self, sender: watch::Sender<RefreshOutcome>, exchange: F) -> Result<()>
	where
		F: Future<Output = Result<()>>,
	{
		// Clears the in-flight slot even if the exchange future panics, so the
		// coordinator can never get stuck marked busy. Followers of a vanished
		// leader observe the closed channel and proceed.
		struct Cleanup<'a>(&'a Mutex<Option<watch::Receiver<RefreshOutcome>>>);
		impl Drop for Cleanup<'_> {
			fn drop(&mut self) {
				*self.0.lock() = None;
			}
		}

		self.metrics.record_attempt();

		let cleanup = Cleanup(&self.inflight);
		let result = exchange.await;

		drop(cleanup);

		match result {
			Ok(()) => {
				self.metrics.record_success();

				let _ = sender.send(Some(Ok(())));

				Ok(())
			},
			Err(e) => {
				self.metrics.record_failure();

				let shared = Arc::new(e);
				let _ = sender.send(Some(Err(shared.clone())));

				Err(Error::Refresh(shared))
			},
		}
	}

	async fn follow(&self, mut receiver: watch::Receiver<RefreshOutcome>) -> Result<()> {
		self.metrics.record_coalesced();

		match time::timeout(self.wait, receiver.wait_for(Option::is_some)).await {
			Ok(Ok(outcome)) => match &*outcome {
				Some(Ok(())) => Ok(()),
				Some(Err(shared)) => Err(Error::Refresh(shared.clone())),
				None => Ok(()),
			},
			// Leader vanished without publishing; nothing left to wait for.
			Ok(Err(_)) => Ok(()),
			// Bounded wait expired. Not an error: the caller's own retry path
			// decides what happens under the possibly still-stale token.
			Err(_) => Ok(()),
		}
	}
}
