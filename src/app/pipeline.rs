//! Shared "view pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load payloads -> compute view for (timeframe, selection)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! The TUI loads once and calls `compute_from_inputs` on every toggle.

use crate::domain::{Selection, Timeframe, ViewConfig};
use crate::engine::{EngineInputs, ViewResult, compute_view};
use crate::error::AppError;
use crate::io::ingest::{LoadedInputs, load_inputs};

/// All computed outputs of a single `pv view` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub inputs: LoadedInputs,
    pub selection: Selection,
    pub view: ViewResult,
}

/// Load both payloads and compute the configured view.
pub fn run_view(config: &ViewConfig) -> Result<RunOutput, AppError> {
    let inputs = load_inputs(config)?;
    let selection = config.selection();
    let view = compute_from_inputs(&inputs, config.timeframe, &selection);

    Ok(RunOutput {
        inputs,
        selection,
        view,
    })
}

/// Compute a view from already-loaded payloads.
pub fn compute_from_inputs(inputs: &LoadedInputs, timeframe: Timeframe, selection: &Selection) -> ViewResult {
    let engine_inputs = EngineInputs {
        historical: &inputs.historical,
        projections: &inputs.projections,
        timeframe,
    };
    compute_view(&engine_inputs, selection)
}
