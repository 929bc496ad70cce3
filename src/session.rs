//! Interactive editing session: the single slot holding the current
//! parameters, bitmap and published result, driven by the recompute
//! scheduler.

use crate::buffer::{PixelBuffer, SourceImage};
use crate::error::Result;
use crate::params::ParameterSet;
use crate::pipeline::EnhancementPipeline;
use crate::scheduler::{Completion, RecomputeScheduler, SchedulerState};

/// Result of one scheduled run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A new buffer was published.
    Published { generation: u64, width: u32, height: u32 },
    /// The run failed; the previously published buffer is still current.
    Failed { generation: u64, message: String },
    /// The run finished after a newer one started; its output was dropped.
    Discarded { generation: u64 },
}

/// One scheduled invocation of the pipeline.
///
/// Holds its own copy of the knobs and of the bitmap, so the session stays
/// free to take new edits (or a new image) while the pixel work runs
/// elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementRun {
    generation: u64,
    image_epoch: u64,
    params: ParameterSet,
    source: Option<SourceImage>,
}

impl EnhancementRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Runs the pipeline on the snapshot. Needs no access to the session.
    pub fn execute(&self) -> Result<PixelBuffer> {
        EnhancementPipeline::new().run(self.source.as_ref(), &self.params)
    }
}

/// Owns everything a slider-driven UI mutates.
///
/// Each run reads the parameters and bitmap as they are when the run starts,
/// not as they were when it was scheduled. Hosts that keep the pixel work off
/// their event loop call [`begin`](Self::begin), execute the run elsewhere
/// and hand the result back through [`complete`](Self::complete);
/// [`tick`](Self::tick) does all three inline.
#[derive(Debug, Default)]
pub struct EnhanceSession {
    scheduler: RecomputeScheduler,
    params: ParameterSet,
    source: Option<SourceImage>,
    /// Bumped on every image load; runs started on an older image are
    /// superseded.
    image_epoch: u64,
    result: Option<PixelBuffer>,
    last_error: Option<String>,
    runs_completed: u64,
}

impl EnhanceSession {
    pub fn new(scheduler: RecomputeScheduler) -> Self {
        Self {
            scheduler,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Latest successfully published buffer.
    pub fn result(&self) -> Option<&PixelBuffer> {
        self.result.as_ref()
    }

    /// Message of the most recent failed run, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Replaces the current bitmap and schedules a recompute.
    ///
    /// The previous bitmap is released here. A run still in flight on the
    /// old bitmap keeps its own copy and is discarded when it completes.
    pub fn load_image(&mut self, image: SourceImage, now: u64) {
        log::info!("loaded {}x{} source", image.width(), image.height());
        if let Some(previous) = self.source.replace(image) {
            log::debug!("released {}x{} source", previous.width(), previous.height());
            drop(previous);
        }
        self.image_epoch += 1;
        self.scheduler.request(now);
    }

    /// Stores new knob values and schedules a recompute.
    pub fn set_params(&mut self, params: ParameterSet, now: u64) {
        self.params = params;
        self.scheduler.request(now);
    }

    /// Advances the clock and starts a run if a debounce window closed.
    pub fn begin(&mut self, now: u64) -> Option<EnhancementRun> {
        let generation = self.scheduler.poll(now)?;
        Some(self.snapshot(generation))
    }

    /// Restores the default knobs and starts a run without waiting for the
    /// debounce window. Returns `None` while another run is in flight; the
    /// reset then runs as soon as that one completes.
    pub fn begin_reset(&mut self) -> Option<EnhancementRun> {
        self.params = ParameterSet::default();
        let generation = self.scheduler.trigger_now()?;
        Some(self.snapshot(generation))
    }

    /// Hands back the output of `run` and publishes it if it is still
    /// current.
    pub fn complete(&mut self, run: EnhancementRun, output: Result<PixelBuffer>) -> RunOutcome {
        let generation = run.generation;
        if self.scheduler.finish(generation) == Completion::Stale || run.image_epoch != self.image_epoch {
            log::debug!("discarding superseded run {}", generation);
            return RunOutcome::Discarded { generation };
        }

        match output {
            Ok(buffer) => {
                let (width, height) = buffer.dimensions();
                self.result = Some(buffer);
                self.last_error = None;
                self.runs_completed += 1;
                RunOutcome::Published { generation, width, height }
            }
            Err(e) => {
                log::warn!("run {} failed: {}", generation, e);
                let message = e.to_string();
                self.last_error = Some(message.clone());
                RunOutcome::Failed { generation, message }
            }
        }
    }

    /// Synchronous [`begin`](Self::begin) + execute + [`complete`](Self::complete).
    pub fn tick(&mut self, now: u64) -> Option<RunOutcome> {
        let run = self.begin(now)?;
        let output = run.execute();
        Some(self.complete(run, output))
    }

    /// Synchronous reset: restores the defaults and recomputes immediately.
    pub fn reset_to_defaults(&mut self) -> Option<RunOutcome> {
        let run = self.begin_reset()?;
        let output = run.execute();
        Some(self.complete(run, output))
    }

    fn snapshot(&self, generation: u64) -> EnhancementRun {
        EnhancementRun {
            generation,
            image_epoch: self.image_epoch,
            params: self.params,
            source: self.source.clone(),
        }
    }
}
