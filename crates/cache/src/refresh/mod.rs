//! Background rebuild and publication of identity snapshots.
//!
//! # Mental model
//!
//! * One tokio task waits on three things: the interval tick, an explicit
//!   [`Refresher::schedule_update`] wake-up, and cancellation.
//! * Each rebuild reads the source and builds indices on the blocking pool, then
//!   publishes into the [`SnapshotStore`].
//! * A failed rebuild publishes nothing; the current snapshot keeps serving.
//!
//! # Lifecycle
//!
//! `Idle → Building → Publishing → Idle` per cycle, `Building → Idle` on a source
//! failure or a panicking rebuild, and `ShuttingDown → Stopped` once
//! [`Refresher::shutdown`] is called. A fatal build error also ends in `Stopped`.
//! A stopped refresher cannot be started again.
//!
//! # Concurrency & ordering
//!
//! * Rebuilds never overlap: the background cycle and [`Refresher::refresh_now`]
//!   share one build lock, so snapshots are published in source-read order.
//! * Wake-ups are a single stored permit ([`Notify`]); any number of requests made
//!   while a rebuild is pending or running yield one extra rebuild.
//! * Cancellation is only observed between rebuilds.

mod state;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub use state::{RefreshState, RefreshStats};

use self::state::Status;
use crate::{BuildPolicy, IdentitySource, LifecycleError, RefreshError, SnapshotBuilder, SnapshotStore};

struct Shared<S> {
	source: S,
	store: Arc<SnapshotStore>,
	policy: BuildPolicy,
	wake: Notify,
	build_lock: Mutex<()>,
	status: Status,
}

enum TaskSlot {
	NotStarted,
	Running { cancel: CancellationToken, join: JoinHandle<()> },
	Stopped,
}

/// Owner of the refresh cycle for one [`SnapshotStore`].
pub struct Refresher<S: IdentitySource> {
	shared: Arc<Shared<S>>,
	task: Mutex<TaskSlot>,
}

impl<S: IdentitySource> Refresher<S> {
	pub fn new(source: S, store: Arc<SnapshotStore>, policy: BuildPolicy) -> Self {
		Self {
			shared: Arc::new(Shared {
				source,
				store,
				policy,
				wake: Notify::new(),
				build_lock: Mutex::new(()),
				status: Status::new(),
			}),
			task: Mutex::new(TaskSlot::NotStarted),
		}
	}

	pub fn store(&self) -> &Arc<SnapshotStore> {
		&self.shared.store
	}

	pub fn state(&self) -> RefreshState {
		self.shared.status.state()
	}

	pub fn stats(&self) -> RefreshStats {
		self.shared.status.stats()
	}

	/// Rebuilds and publishes on the calling thread, returning the new generation.
	///
	/// Blocks the thread while a background rebuild is in flight. From async code
	/// use [`Self::refresh`] instead.
	pub fn refresh_now(&self) -> Result<u64, RefreshError> {
		self.shared.rebuild()
	}

	/// Async form of [`Self::refresh_now`]: the rebuild runs on the blocking pool.
	pub async fn refresh(&self) -> Result<u64, RefreshError> {
		rebuild_on_pool(Arc::clone(&self.shared)).await
	}

	/// Spawns the periodic cycle on the current tokio runtime.
	///
	/// The first periodic rebuild happens one `interval` after start; call
	/// [`Self::refresh_now`] or [`Self::schedule_update`] to populate sooner.
	pub fn start(&self, interval: Duration) -> Result<(), LifecycleError> {
		if interval.is_zero() {
			return Err(LifecycleError::ZeroInterval);
		}
		let mut slot = self.task.lock();
		if !matches!(*slot, TaskSlot::NotStarted) {
			return Err(LifecycleError::AlreadyStarted);
		}
		let handle = tokio::runtime::Handle::try_current().map_err(|_| LifecycleError::NoRuntime)?;

		let cancel = CancellationToken::new();
		let join = handle.spawn(run_cycle(Arc::clone(&self.shared), interval, cancel.clone()));
		*slot = TaskSlot::Running { cancel, join };
		tracing::info!(interval_ms = interval.as_millis() as u64, "ugid.refresher.start");
		Ok(())
	}

	/// Requests an out-of-cycle rebuild as soon as the current one (if any) is done.
	pub fn schedule_update(&self) {
		tracing::trace!(state = self.state().as_str(), "ugid.refresher.schedule");
		self.shared.wake.notify_one();
	}

	/// Stops future cycles and waits for an in-flight rebuild to finish.
	pub async fn shutdown(&self) -> Result<(), LifecycleError> {
		let (cancel, join) = {
			let mut slot = self.task.lock();
			match std::mem::replace(&mut *slot, TaskSlot::Stopped) {
				TaskSlot::Running { cancel, join } => (cancel, join),
				other => {
					*slot = other;
					return Err(LifecycleError::NotStarted);
				}
			}
		};

		tracing::info!(state = self.state().as_str(), "ugid.refresher.shutdown");
		self.shared.status.force(RefreshState::ShuttingDown);
		cancel.cancel();
		if let Err(error) = join.await {
			tracing::warn!(%error, "ugid.refresher.join_failed");
		}
		self.shared.status.force(RefreshState::Stopped);
		Ok(())
	}
}

impl<S: IdentitySource> Drop for Refresher<S> {
	fn drop(&mut self) {
		if let TaskSlot::Running { cancel, .. } = &*self.task.get_mut() {
			cancel.cancel();
		}
	}
}

impl<S: IdentitySource> Shared<S> {
	fn rebuild(&self) -> Result<u64, RefreshError> {
		let _build = self.build_lock.lock();
		let started = Instant::now();
		self.status.step(RefreshState::Building);

		let built = self
			.source
			.read()
			.map_err(RefreshError::from)
			.and_then(|records| {
				SnapshotBuilder::new(&self.policy)
					.build(records)
					.map_err(RefreshError::from)
			});
		let snapshot = match built {
			Ok(snapshot) => snapshot,
			Err(error) => {
				self.status.record_failure(&error);
				self.status.step(RefreshState::Idle);
				if error.is_fatal() {
					tracing::error!(%error, "ugid.refresh.fatal");
				} else {
					tracing::warn!(%error, "ugid.refresh.failed");
				}
				return Err(error);
			}
		};

		self.status.step(RefreshState::Publishing);
		let users = snapshot.uid_map().len();
		let groups = snapshot.gid_map().len();
		let generation = self.store.publish(snapshot);
		self.status.record_success(generation);
		self.status.step(RefreshState::Idle);
		tracing::debug!(
			generation,
			users,
			groups,
			elapsed_ms = started.elapsed().as_millis() as u64,
			"ugid.refresh.published"
		);
		Ok(generation)
	}

	/// Counts a rebuild that died on the blocking pool as a failure.
	fn worker_failed(&self, error: JoinError) -> RefreshError {
		let error = RefreshError::Worker(error.to_string());
		self.status.record_failure(&error);
		self.status.step(RefreshState::Idle);
		tracing::error!(%error, "ugid.refresh.worker_failed");
		error
	}

	/// Applies the outcome of one background rebuild. Returns `false` once the
	/// cycle must stop.
	fn settle(&self, outcome: &Result<u64, RefreshError>) -> bool {
		match outcome {
			Err(error) if error.is_fatal() => {
				self.status.force(RefreshState::Stopped);
				false
			}
			// Anything else was already logged and counted.
			_ => true,
		}
	}
}

async fn rebuild_on_pool<S: IdentitySource>(shared: Arc<Shared<S>>) -> Result<u64, RefreshError> {
	let worker = Arc::clone(&shared);
	match tokio::task::spawn_blocking(move || worker.rebuild()).await {
		Ok(outcome) => outcome,
		Err(error) => Err(shared.worker_failed(error)),
	}
}

async fn run_cycle<S: IdentitySource>(shared: Arc<Shared<S>>, period: Duration, cancel: CancellationToken) {
	let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			_ = shared.wake.notified() => {}
			_ = ticker.tick() => {}
		}

		let outcome = rebuild_on_pool(Arc::clone(&shared)).await;
		if !shared.settle(&outcome) {
			tracing::error!("ugid.refresher.halted");
			return;
		}
	}
	tracing::debug!("ugid.refresher.stopped");
}
