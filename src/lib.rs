//! ---------------------------------------------------------------------------------------
//! Clio Enhance Core
//! ---------------------------------------------------------------------------------------
//! Single-photo enhancement engine. A source bitmap and a nine-knob
//! `ParameterSet` go through a deterministic chain:
//!
//! 1. Resample to the boosted resolution with exposure/contrast/saturation
//!    baked into the draw.
//! 2. 3×3 box blur of the working buffer (only when clarity or smoothness is
//!    set).
//! 3. One fused, row-parallel pass of tone shaping and detail mixing.
//!
//! `EnhanceSession` wraps the pipeline with a debounced recompute scheduler
//! so a slider-driven UI only pays for the last change in a burst.
//!
//! All color math runs on 8-bit gamma-encoded RGB; there is no color
//! management.
//! ---------------------------------------------------------------------------------------

pub mod blur;
pub mod buffer;
pub mod detail;
pub mod error;
pub mod export;
pub mod params;
pub mod pipeline;
pub mod resample;
pub mod scheduler;
pub mod session;
pub mod tone;

pub use buffer::{PixelBuffer, SourceImage};
pub use error::{EnhanceError, Result};
pub use params::ParameterSet;
pub use pipeline::{enhance, EnhancementPipeline};
pub use scheduler::{Completion, RecomputeScheduler, SchedulerState, DEFAULT_DEBOUNCE};
pub use session::{EnhanceSession, EnhancementRun, RunOutcome};
