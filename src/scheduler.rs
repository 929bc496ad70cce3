//! Debounced recompute scheduling.
//!
//! `RecomputeScheduler` is a pure state machine over caller-supplied time
//! units. It never sleeps or spawns: the host feeds it events and clock
//! ticks, and it answers with the generation to run (if any).
//!
//! ```text
//! Idle --request--> Scheduled --deadline--> Running --finish--> Idle
//!                    ^    |                    |
//!                    +----+ request (re-arm)   +--finish w/ queued--> Scheduled
//! ```
//!
//! At most one run is active at a time. A change arriving while a run is in
//! flight is queued and becomes the next `Scheduled` cycle when the run
//! finishes; the in-flight run is never interrupted.

/// Debounce window applied to parameter changes and new images.
pub const DEFAULT_DEBOUNCE: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Waiting for the debounce window to close.
    Scheduled { deadline: u64 },
    /// A pipeline run for `generation` is in flight.
    Running { generation: u64 },
}

/// What the host should do with a finished run's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result belongs to the latest generation; publish it.
    Current,
    /// A newer generation has been started since; discard the result.
    Stale,
}

/// Change that arrived while a run was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Debounced change; fires `delay` after its request time.
    Debounced { deadline: u64 },
    /// Manual trigger; starts as soon as the current run finishes.
    Immediate,
}

#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    delay: u64,
    state: SchedulerState,
    pending: Option<Pending>,
    generation: u64,
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RecomputeScheduler {
    pub fn new(delay: u64) -> Self {
        Self {
            delay,
            state: SchedulerState::Idle,
            pending: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Latest generation handed out, 0 before the first run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a change is waiting behind the current run.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a parameter change or new image at time `now`.
    ///
    /// Arms (or re-arms) the debounce window. While running, the request is
    /// queued for the next cycle instead.
    pub fn request(&mut self, now: u64) {
        let deadline = now.saturating_add(self.delay);
        match self.state {
            SchedulerState::Idle | SchedulerState::Scheduled { .. } => {
                self.state = SchedulerState::Scheduled { deadline };
            }
            SchedulerState::Running { .. } => {
                // A queued manual trigger already covers this change.
                if self.pending != Some(Pending::Immediate) {
                    self.pending = Some(Pending::Debounced { deadline });
                }
            }
        }
    }

    /// Manual trigger that bypasses the debounce window.
    ///
    /// Returns the generation to run now, or `None` when a run is already in
    /// flight (a follow-up run is queued instead).
    pub fn trigger_now(&mut self) -> Option<u64> {
        match self.state {
            SchedulerState::Running { .. } => {
                self.pending = Some(Pending::Immediate);
                None
            }
            _ => Some(self.start()),
        }
    }

    /// Advances the clock to `now`.
    ///
    /// Returns the generation to run when a debounce window has expired.
    pub fn poll(&mut self, now: u64) -> Option<u64> {
        match self.state {
            SchedulerState::Scheduled { deadline } if now >= deadline => Some(self.start()),
            _ => None,
        }
    }

    /// Reports the end of the run for `generation`.
    ///
    /// The machine leaves `Running` only when the reported generation is the
    /// one in flight; any other report is stale and changes nothing.
    pub fn finish(&mut self, generation: u64) -> Completion {
        match self.state {
            SchedulerState::Running { generation: active } if active == generation => {
                self.state = match self.pending.take() {
                    Some(Pending::Debounced { deadline }) => SchedulerState::Scheduled { deadline },
                    Some(Pending::Immediate) => SchedulerState::Scheduled { deadline: 0 },
                    None => SchedulerState::Idle,
                };
                Completion::Current
            }
            _ => Completion::Stale,
        }
    }

    fn start(&mut self) -> u64 {
        self.generation += 1;
        self.state = SchedulerState::Running {
            generation: self.generation,
        };
        self.generation
    }
}
