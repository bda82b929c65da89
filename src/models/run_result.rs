use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StageError;
use crate::models::{DetailedTestCase, Stage, StageStatus};

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Registro de una ejecución del pipeline para un ticket
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: Uuid,
    pub issue_key: String,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageOutcome>,
    pub generate_tokens: u64,
    pub transform_tokens: u64,
    pub expected_rows: Option<usize>,
    pub exported_rows: Option<usize>,
    pub structured_text: Option<String>,
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exported: Vec<DetailedTestCase>,
    pub error: Option<String>,
}

impl RunResult {
    pub fn new(issue_key: &str) -> Self {
        RunResult {
            run_id: Uuid::new_v4(),
            issue_key: issue_key.to_string(),
            started_at: Utc::now(),
            stages: Stage::ALL
                .iter()
                .map(|&stage| StageOutcome {
                    stage,
                    status: StageStatus::Pending,
                })
                .collect(),
            generate_tokens: 0,
            transform_tokens: 0,
            expected_rows: None,
            exported_rows: None,
            structured_text: None,
            attachment: None,
            exported: Vec::new(),
            error: None,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.generate_tokens + self.transform_tokens
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        self.stages
            .iter()
            .find(|outcome| outcome.stage == stage)
            .map(|outcome| outcome.status)
            .unwrap_or(StageStatus::Pending)
    }

    pub fn mark(&mut self, stage: Stage, status: StageStatus) {
        if let Some(outcome) = self.stages.iter_mut().find(|o| o.stage == stage) {
            outcome.status = status;
        }
    }

    /// Registra el fallo terminal; las etapas siguientes no se ejecutan
    pub fn fail(&mut self, error: StageError) {
        self.mark(error.stage, StageStatus::Failed);
        self.error = Some(error.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && self
                .stages
                .iter()
                .all(|o| matches!(o.status, StageStatus::Succeeded | StageStatus::Skipped))
    }
}
