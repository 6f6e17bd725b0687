//! The background loop and its start/stop control.
//!
//! `start` spawns one task per run; the task iterates, publishes, and
//! sleeps until the next iteration or a stop signal, whichever comes
//! first. `stop` is cooperative: flags flip immediately, the in-flight
//! iteration finishes its external calls and publishes (or abandons on
//! error), and the loop exits at the checkpoint after it.
//!
//! The loop is spawned on the runtime the orchestrator was created on,
//! not on whichever runtime calls `start`. Request handlers run on
//! short-lived per-worker runtimes; the loop must outlive them.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::pipeline::{Collaborators, Pipeline};
use crate::state::CycleState;
use crate::{CycleConfig, CycleError};

struct RunHandle {
    generation: u64,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the cycle loop for one [`CycleState`].
pub struct Orchestrator {
    state: Arc<CycleState>,
    pipeline: Arc<Pipeline>,
    runtime: Handle,
    control: Mutex<Option<RunHandle>>,
}

impl Orchestrator {
    /// Creates an idle orchestrator bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Config`] if `config` is invalid, or
    /// [`CycleError::Runtime`] if called outside a Tokio runtime.
    pub fn new(
        state: Arc<CycleState>,
        collaborators: Collaborators,
        config: CycleConfig,
    ) -> Result<Self, CycleError> {
        config.validate()?;
        Ok(Self {
            state,
            pipeline: Arc::new(Pipeline::new(collaborators, config)),
            runtime: Handle::try_current()?,
            control: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn state(&self) -> &Arc<CycleState> {
        &self.state
    }

    /// Launches the loop on the orchestrator's runtime and returns the
    /// run's generation. Does not wait for the first iteration.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::AlreadyRunning`] if a run is in progress.
    pub fn start(&self) -> Result<u64, CycleError> {
        let mut control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if self.state.is_running() {
            return Err(CycleError::AlreadyRunning);
        }

        let generation = self.state.begin_run();
        let (stop, stop_rx) = watch::channel(false);
        let task = self.runtime.spawn(run_loop(
            Arc::clone(&self.state),
            Arc::clone(&self.pipeline),
            generation,
            stop_rx,
        ));

        if let Some(previous) = control.replace(RunHandle {
            generation,
            stop,
            task,
        }) {
            log::debug!(
                "Detaching run {} (finished: {})",
                previous.generation,
                previous.task.is_finished()
            );
        }

        log::info!("Danger-zone cycle started (run {generation})");
        Ok(generation)
    }

    /// Requests the loop to stop after the in-flight iteration.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::NotRunning`] if no run is in progress.
    pub fn stop(&self) -> Result<(), CycleError> {
        let control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.state.is_running() {
            return Err(CycleError::NotRunning);
        }

        self.state.request_stop();
        if let Some(handle) = control.as_ref() {
            handle.stop.send_replace(true);
            log::info!(
                "Stop requested for run {}; finishing the current iteration",
                handle.generation
            );
        }
        Ok(())
    }

    /// Stops the loop and waits up to `grace` for it to exit, aborting
    /// the task if it does not.
    pub async fn shutdown(&self, grace: Duration) {
        let handle = self
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if self.state.is_running() {
            self.state.request_stop();
        }

        let Some(handle) = handle else {
            return;
        };
        handle.stop.send_replace(true);

        let abort = handle.task.abort_handle();
        match tokio::time::timeout(grace, handle.task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::warn!("Run {} ended abnormally: {e}", handle.generation);
                self.state.finish_run(handle.generation);
            }
            Err(_) => {
                log::warn!(
                    "Run {} did not stop within {}s; aborting",
                    handle.generation,
                    grace.as_secs()
                );
                abort.abort();
                self.state.finish_run(handle.generation);
            }
        }
    }
}

async fn run_loop(
    state: Arc<CycleState>,
    pipeline: Arc<Pipeline>,
    generation: u64,
    mut stop: watch::Receiver<bool>,
) {
    let interval = pipeline.config().interval();

    loop {
        let started_at = Utc::now();
        match pipeline.run_once(started_at).await {
            Ok(output) => match state.publish(generation, output) {
                Some(cycle) => log::info!("Published cycle {cycle} (run {generation})"),
                None => log::info!("Discarding output of superseded run {generation}"),
            },
            Err(e) => {
                log::error!("Cycle iteration failed, keeping previous data: {e}");
            }
        }

        if *stop.borrow_and_update() {
            break;
        }

        let stopped = tokio::select! {
            () = tokio::time::sleep(interval) => false,
            changed = stop.changed() => changed.is_err() || *stop.borrow(),
        };
        if stopped {
            break;
        }
    }

    state.finish_run(generation);
    log::info!("Danger-zone cycle stopped (run {generation})");
}
