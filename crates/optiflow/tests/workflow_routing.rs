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

use async_trait::async_trait;
use llm_contracts::{LlmError, LlmResult};
use optiflow::executor::ExecutorConfig;
use optiflow::llm::{LlmAdapter, LlmManager};
use optiflow::workflow::{
    SessionStatus, SolutionSource, Workflow, WorkflowConfig, WorkflowInput,
};
use scenarios::Scenario;
use std::sync::Arc;

struct ScriptedAdapter {
    verdict: &'static str,
    script: &'static str,
}

#[async_trait]
impl LlmAdapter for ScriptedAdapter {
    async fn generate_response(&self, prompt: &str) -> LlmResult<String> {
        if prompt.contains("Predictions:") {
            Ok("The predicted tables describe demand and supply.".to_string())
        } else if prompt.contains("Output must follow this format") {
            Ok("Given Data: stores and plants.\nProblem Statement: match supply to demand.\n\
                Objective: what allocation minimises cost?\nConstraints: 1. capacity."
                .to_string())
        } else if prompt.contains("Act as a Python developer") {
            Ok(format!("```python\n{}\n```", self.script))
        } else if prompt.contains("code reviewer") {
            Ok(format!("{{\"verdict\": \"{}\"}}", self.verdict))
        } else if prompt.contains("Act as an expert in mathematics") {
            Ok("The minimal cost is 42 USD.".to_string())
        } else if prompt.contains("Optimal Results:") {
            Ok("The executed solver allocates everything at cost 7 USD.".to_string())
        } else if prompt.contains("expert report writer") {
            Ok("# Report\n\nEverything balanced.".to_string())
        } else {
            Err(LlmError::Api(format!("unexpected prompt: {prompt}")))
        }
    }
}

fn workflow_with(verdict: &'static str, script: &'static str) -> Workflow {
    let manager = LlmManager::from_adapter(Box::new(ScriptedAdapter { verdict, script }));
    Workflow::new(
        Arc::new(manager),
        WorkflowConfig {
            narrate_data: true,
            executor: ExecutorConfig {
                program: "sh".to_string(),
                args: Vec::new(),
                extension: "sh".to_string(),
                timeout_secs: 5,
                work_dir: None,
            },
        },
    )
}

#[tokio::test]
async fn test_approved_script_is_executed() {
    let workflow = workflow_with("yes", "echo optimal cost 7");
    let record = workflow
        .run(WorkflowInput::Scenario {
            scenario: Scenario::DemandSupplyMatching,
            seed: 42,
        })
        .await;

    assert_eq!(record.status, SessionStatus::Completed);
    assert_eq!(record.scenario.as_deref(), Some("demand-supply-matching"));
    assert_eq!(record.review_verdict.as_deref(), Some("yes"));
    assert_eq!(record.solution_source, Some(SolutionSource::Executed));
    assert!(record
        .execution_output
        .as_deref()
        .unwrap()
        .contains("optimal cost 7"));
    assert!(record.solution.as_deref().unwrap().contains("cost 7 USD"));
    assert!(record.narrated_data.is_some());
    assert!(record.report.as_deref().unwrap().starts_with("# Report"));
}

#[tokio::test]
async fn test_rejected_script_routes_to_analytical_branch() {
    let workflow = workflow_with("no", "echo never run");
    let record = workflow
        .run(WorkflowInput::Scenario {
            scenario: Scenario::CustomerOrderFulfillment,
            seed: 1,
        })
        .await;

    assert_eq!(record.status, SessionStatus::Completed);
    assert_eq!(record.review_verdict.as_deref(), Some("no"));
    assert_eq!(record.solution_source, Some(SolutionSource::Analytical));
    assert!(record.execution_output.is_none());
    assert!(record.solution.as_deref().unwrap().contains("42 USD"));
    assert!(record.report.is_some());
}

#[tokio::test]
async fn test_execution_failure_falls_back_to_analytical_branch() {
    let workflow = workflow_with("yes", "echo infeasible >&2\nexit 9");
    let record = workflow
        .run(WorkflowInput::Scenario {
            scenario: Scenario::TransportationOptimization,
            seed: 3,
        })
        .await;

    assert_eq!(record.status, SessionStatus::Completed);
    assert_eq!(record.review_verdict.as_deref(), Some("yes"));
    assert_eq!(record.solution_source, Some(SolutionSource::Analytical));
    assert!(record.execution_output.is_none());
    assert!(record.solution.as_deref().unwrap().contains("42 USD"));
}

#[tokio::test]
async fn test_custom_problem_statement_skips_framing() {
    let workflow = workflow_with("no", "echo unused");
    let statement = "Two factories, three depots, minimise freight spend.";
    let record = workflow
        .run(WorkflowInput::Custom {
            problem_statement: statement.to_string(),
        })
        .await;

    assert_eq!(record.status, SessionStatus::Completed);
    assert!(record.scenario.is_none());
    assert!(record.narrated_data.is_none());
    assert!(record.data_markdown.is_none());
    assert_eq!(record.framed_problem.as_deref(), Some(statement));
}

#[tokio::test]
async fn test_empty_solver_script_fails_the_session() {
    let workflow = workflow_with("yes", "");
    let record = workflow
        .run(WorkflowInput::Scenario {
            scenario: Scenario::InventoryOptimization,
            seed: 5,
        })
        .await;

    assert_eq!(record.status, SessionStatus::Failed);
    assert!(record
        .error
        .as_deref()
        .unwrap()
        .contains("empty solver script"));
    assert!(record.report.is_none());
}
