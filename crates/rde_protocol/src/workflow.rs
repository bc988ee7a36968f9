//! `WorkflowStatus`: the per-tile run outcome record (`spec.md` §3).

use serde::Serialize;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowOutcome {
    Success,
    Skipped,
    Failed,
}

/// The mode a tile was processed under (§4.C4's fixed-priority selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Invoice,
    ExcelInvoice,
    MultiDataTile,
    RdeFormat,
    SmartTable,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Invoice => "Invoice",
            Mode::ExcelInvoice => "ExcelInvoice",
            Mode::MultiDataTile => "MultiDataTile",
            Mode::RdeFormat => "RDEFormat",
            Mode::SmartTable => "SmartTable",
        }
    }
}

#[derive(Debug)]
pub struct WorkflowStatus {
    pub tile_index: usize,
    pub mode: Mode,
    pub outcome: WorkflowOutcome,
    pub error: Option<PipelineError>,
}

impl WorkflowStatus {
    pub fn success(tile_index: usize, mode: Mode) -> Self {
        Self {
            tile_index,
            mode,
            outcome: WorkflowOutcome::Success,
            error: None,
        }
    }

    pub fn skipped(tile_index: usize, mode: Mode) -> Self {
        Self {
            tile_index,
            mode,
            outcome: WorkflowOutcome::Skipped,
            error: None,
        }
    }

    pub fn failed(tile_index: usize, mode: Mode, error: PipelineError) -> Self {
        Self {
            tile_index,
            mode,
            outcome: WorkflowOutcome::Failed,
            error: Some(error),
        }
    }
}

/// Run-level aggregation over a vector of `WorkflowStatus`, preserving
/// tile order (§3). The dispatcher runs to completion unconditionally;
/// `overall_outcome` is `Failed` if any tile failed, else `Success`.
#[derive(Debug)]
pub struct RunSummary {
    pub statuses: Vec<WorkflowStatus>,
}

impl RunSummary {
    pub fn new(statuses: Vec<WorkflowStatus>) -> Self {
        Self { statuses }
    }

    pub fn overall_outcome(&self) -> WorkflowOutcome {
        if self
            .statuses
            .iter()
            .any(|s| s.outcome == WorkflowOutcome::Failed)
        {
            WorkflowOutcome::Failed
        } else {
            WorkflowOutcome::Success
        }
    }

    /// §6: exit code 0 success, 1 validation failure, 2 usage/config error.
    /// Usage/config errors surface as a top-level `FatalError` before a
    /// `RunSummary` even exists, so this only distinguishes 0 vs 1.
    pub fn exit_code(&self) -> i32 {
        match self.overall_outcome() {
            WorkflowOutcome::Success | WorkflowOutcome::Skipped => 0,
            WorkflowOutcome::Failed => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_outcome_is_failed_if_any_tile_failed() {
        let statuses = vec![
            WorkflowStatus::success(0, Mode::Invoice),
            WorkflowStatus::failed(
                1,
                Mode::Invoice,
                PipelineError::new(
                    1,
                    crate::error::ProcessorKind::Validator,
                    crate::error::PipelineErrorKind::Validation(crate::error::ValidationReport::new()),
                ),
            ),
        ];
        let summary = RunSummary::new(statuses);
        assert_eq!(summary.overall_outcome(), WorkflowOutcome::Failed);
        assert_eq!(summary.exit_code(), 1);
    }
}
