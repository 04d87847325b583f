// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionSource {
    Executed,
    Analytical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub task: String,
    pub scenario: Option<String>,
    pub seed: Option<u64>,
    pub data_markdown: Option<String>,
    pub narrated_data: Option<String>,
    pub framed_problem: Option<String>,
    pub solver_script: Option<String>,
    pub review_verdict: Option<String>,
    pub execution_output: Option<String>,
    pub solution: Option<String>,
    pub solution_source: Option<SolutionSource>,
    pub report: Option<String>,
    pub status: SessionStatus,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            scenario: None,
            seed: None,
            data_markdown: None,
            narrated_data: None,
            framed_problem: None,
            solver_script: None,
            review_verdict: None,
            execution_output: None,
            solution: None,
            solution_source: None,
            report: None,
            status: SessionStatus::Running,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_running_and_empty() {
        let record = SessionRecord::new("Demand-Supply Matching");
        assert_eq!(record.status, SessionStatus::Running);
        assert!(record.report.is_none());
        assert!(record.finished_at.is_none());
    }

    #[test]
    fn test_complete_stamps_finish_time() {
        let mut record = SessionRecord::new("Demand Forecasting");
        record.complete();
        assert_eq!(record.status, SessionStatus::Completed);
        assert!(record.finished_at.is_some());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_fail_keeps_the_error_message() {
        let mut record = SessionRecord::new("Supplier Risk Assessment");
        record.fail("upstream unavailable");
        assert_eq!(record.status, SessionStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("upstream unavailable"));
    }

    #[test]
    fn test_status_serialises_snake_case() {
        let json = serde_json::to_string(&SessionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
