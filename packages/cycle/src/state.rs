//! Process-wide cycle state shared between the background loop and the
//! request handlers.
//!
//! Published data lives in one immutable [`CycleSnapshot`] behind an
//! [`ArcSwapOption`]: the loop swaps in a whole new snapshot at the end
//! of a successful iteration and readers take an `Arc` to whichever
//! snapshot is current. A reader can therefore never see polygons from
//! one iteration next to advice from another.
//!
//! Control flags (`running`, `active`, `stop_requested`) are plain
//! atomics and change immediately when the request layer asks.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use polaris_ai::records::Advice;
use polaris_geometry::ZoneSet;
use serde::Serialize;

/// Lifecycle of the background loop.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CyclePhase {
    /// Never started.
    #[default]
    Idle,
    /// The loop is iterating.
    Running,
    /// A stop was requested; the in-flight iteration is finishing.
    StopRequested,
    /// The loop has exited.
    Stopped,
}

/// Everything one successful iteration publishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSnapshot {
    /// Sequence number of the iteration that produced this snapshot,
    /// starting at 1 and counting every publish since process start.
    pub cycle: u64,
    /// When the iteration finished.
    pub completed_at: DateTime<Utc>,
    /// Current danger zones.
    pub polygons: ZoneSet,
    /// Predicted danger zones.
    pub predictions: ZoneSet,
    /// Safety advice for the current disaster type.
    pub advice: Advice,
}

/// What a getter should answer right now.
#[derive(Debug, Clone, PartialEq)]
pub enum StateView {
    /// The loop is not running; the client should start it.
    NotRunning,
    /// The loop is running but has not completed an iteration yet.
    Pending,
    /// The latest published data.
    Ready(Arc<CycleSnapshot>),
}

/// Data published by an iteration, before it is numbered.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutput {
    /// Current danger zones.
    pub polygons: ZoneSet,
    /// Predicted danger zones.
    pub predictions: ZoneSet,
    /// Safety advice.
    pub advice: Advice,
}

/// The shared state holder. Create one per process (or per test) and
/// hand `Arc` clones to the orchestrator and the request layer.
#[derive(Debug, Default)]
pub struct CycleState {
    snapshot: ArcSwapOption<CycleSnapshot>,
    published: AtomicU64,
    generation: AtomicU64,
    running: AtomicBool,
    active: AtomicBool,
    stop_requested: AtomicBool,
    phase: Mutex<CyclePhase>,
}

impl CycleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<CycleSnapshot>> {
        self.snapshot.load_full()
    }

    /// True from `start` until a stop is requested.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// True once the current run has published at least once.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn phase(&self) -> CyclePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of the last published iteration, or 0.
    #[must_use]
    pub fn last_cycle(&self) -> u64 {
        self.snapshot().map_or(0, |s| s.cycle)
    }

    /// Tri-state answer for the getters: not running, waiting for the
    /// first iteration, or the current snapshot.
    #[must_use]
    pub fn view(&self) -> StateView {
        if !self.is_running() {
            return StateView::NotRunning;
        }
        if !self.is_active() {
            return StateView::Pending;
        }
        self.snapshot().map_or(StateView::Pending, StateView::Ready)
    }

    fn set_phase(&self, phase: CyclePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Marks a new run as started and returns its generation.
    ///
    /// The phase lock is held while the generation changes so that a
    /// concurrent [`Self::publish`] from the previous run either lands
    /// before the switch or is discarded.
    pub(crate) fn begin_run(&self) -> u64 {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop_requested.store(false, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        *phase = CyclePhase::Running;
        generation
    }

    /// Flips the control flags for a stop request.
    pub(crate) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        self.set_phase(CyclePhase::StopRequested);
    }

    /// Swaps in a new snapshot and returns its cycle number.
    ///
    /// Output from a run that has been superseded by a newer `start` is
    /// discarded and `None` is returned, so the newest run is the only
    /// writer. A run that was stopped but not superseded still publishes
    /// its in-flight iteration, without marking the state active.
    pub(crate) fn publish(&self, generation: u64, output: CycleOutput) -> Option<u64> {
        let _phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(generation) {
            return None;
        }

        let cycle = self.published.fetch_add(1, Ordering::SeqCst) + 1;
        self.snapshot.store(Some(Arc::new(CycleSnapshot {
            cycle,
            completed_at: Utc::now(),
            polygons: output.polygons,
            predictions: output.predictions,
            advice: output.advice,
        })));

        if !self.is_stop_requested() {
            self.active.store(true, Ordering::SeqCst);
        }
        Some(cycle)
    }

    /// Records that the loop for `generation` has exited.
    pub(crate) fn finish_run(&self, generation: u64) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_current(generation) {
            self.running.store(false, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
            *phase = CyclePhase::Stopped;
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
