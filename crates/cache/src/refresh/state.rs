use parking_lot::Mutex;

/// Where the refresher is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshState {
	/// Waiting for the next tick or an explicit request.
	Idle,
	/// Reading the source and building indices.
	Building,
	/// Swapping the new snapshot into the store.
	Publishing,
	/// Shutdown requested; an in-flight build may still finish.
	ShuttingDown,
	/// The cycle has exited.
	Stopped,
}

impl RefreshState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Building => "building",
			Self::Publishing => "publishing",
			Self::ShuttingDown => "shutting_down",
			Self::Stopped => "stopped",
		}
	}
}

/// Counters describing refresher history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
	/// Rebuilds that ended in a publish.
	pub builds: u64,
	/// Rebuilds that failed before publishing.
	pub failures: u64,
	/// Generation of the most recent publish by this refresher.
	pub last_generation: Option<u64>,
	pub last_error: Option<String>,
}

#[derive(Debug)]
pub(super) struct Status {
	state: Mutex<RefreshState>,
	stats: Mutex<RefreshStats>,
}

impl Status {
	pub(super) fn new() -> Self {
		Self {
			state: Mutex::new(RefreshState::Idle),
			stats: Mutex::new(RefreshStats::default()),
		}
	}

	pub(super) fn state(&self) -> RefreshState {
		*self.state.lock()
	}

	/// Moves through the build cycle unless a shutdown already claimed the state.
	pub(super) fn step(&self, next: RefreshState) {
		let mut state = self.state.lock();
		if !matches!(*state, RefreshState::ShuttingDown | RefreshState::Stopped) {
			*state = next;
		}
	}

	pub(super) fn force(&self, next: RefreshState) {
		*self.state.lock() = next;
	}

	pub(super) fn stats(&self) -> RefreshStats {
		self.stats.lock().clone()
	}

	pub(super) fn record_success(&self, generation: u64) {
		let mut stats = self.stats.lock();
		stats.builds += 1;
		stats.last_generation = Some(generation);
	}

	pub(super) fn record_failure(&self, error: &dyn std::error::Error) {
		let mut stats = self.stats.lock();
		stats.failures += 1;
		stats.last_error = Some(error.to_string());
	}
}
