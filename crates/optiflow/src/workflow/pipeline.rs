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

use crate::executor::{ExecutorConfig, ScriptExecutor};
use crate::llm::utils::extract_script;
use crate::llm::LlmManager;
use crate::prompts::{context_builders, names, PromptContext, PromptLibrary};
use crate::workflow::session::{SessionRecord, SolutionSource};
use llm_contracts::LlmError;
use scenarios::Scenario;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub mod events {
    pub const WORKFLOW_STARTED: &str = "workflow_started";
    pub const DATA_NARRATED: &str = "data_narrated";
    pub const PROBLEM_FRAMED: &str = "problem_framed";
    pub const SOLVER_GENERATED: &str = "solver_generated";
    pub const REVIEW_COMPLETED: &str = "review_completed";
    pub const SOLVER_EXECUTED: &str = "solver_executed";
    pub const EXECUTION_FELL_BACK: &str = "execution_fell_back";
    pub const ANALYTICAL_SOLUTION: &str = "analytical_solution";
    pub const REPORT_WRITTEN: &str = "report_written";
    pub const WORKFLOW_COMPLETED: &str = "workflow_completed";
    pub const WORKFLOW_FAILED: &str = "workflow_failed";
}

pub mod fields {
    pub const VERDICT: &str = "verdict";
    pub const VERDICT_YES: &str = "yes";
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model returned an empty solver script")]
    EmptyScript,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub narrate_data: bool,
    pub executor: ExecutorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            narrate_data: true,
            executor: ExecutorConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowInput {
    Scenario { scenario: Scenario, seed: u64 },
    Custom { problem_statement: String },
}

pub struct Workflow {
    llm: Arc<LlmManager>,
    prompts: PromptLibrary,
    executor: ScriptExecutor,
    config: WorkflowConfig,
}

impl Workflow {
    pub fn new(llm: Arc<LlmManager>, config: WorkflowConfig) -> Self {
        Self {
            llm,
            prompts: PromptLibrary::with_optimisation_templates(),
            executor: ScriptExecutor::new(config.executor.clone()),
            config,
        }
    }

    pub fn with_defaults(llm: Arc<LlmManager>) -> Self {
        Self::new(llm, WorkflowConfig::default())
    }

    pub async fn run(&self, input: WorkflowInput) -> SessionRecord {
        let task = match &input {
            WorkflowInput::Scenario { scenario, .. } => scenario.title().to_string(),
            WorkflowInput::Custom { .. } => "Resource Optimization".to_string(),
        };
        let mut record = SessionRecord::new(task);
        info!(
            event = events::WORKFLOW_STARTED,
            session_id = %record.id,
            task = %record.task,
            "Workflow starting"
        );

        match self.execute(&mut record, input).await {
            Ok(()) => {
                record.complete();
                info!(
                    event = events::WORKFLOW_COMPLETED,
                    session_id = %record.id,
                    "Workflow finished"
                );
            }
            Err(e) => {
                error!(
                    event = events::WORKFLOW_FAILED,
                    session_id = %record.id,
                    error = %e,
                    "Workflow failed"
                );
                record.fail(e.to_string());
            }
        }
        record
    }

    async fn execute(
        &self,
        record: &mut SessionRecord,
        input: WorkflowInput,
    ) -> Result<(), WorkflowError> {
        let framed = match input {
            WorkflowInput::Scenario { scenario, seed } => {
                let data = scenarios::generate(scenario, seed);
                let data_md = data.tables_markdown();
                record.scenario = Some(scenario.slug().to_string());
                record.seed = Some(seed);
                record.data_markdown = Some(data_md.clone());

                if self.config.narrate_data {
                    let mut context = PromptContext::new();
                    context.insert("data".to_string(), json!(data_md));
                    let narrated = self.call(names::NARRATE_DATA, &context).await?;
                    info!(event = events::DATA_NARRATED, session_id = %record.id);
                    record.narrated_data = Some(narrated);
                }

                let framed = self
                    .call(
                        names::FRAME_PROBLEM,
                        &context_builders::data_context(&record.task, &data_md),
                    )
                    .await?;
                info!(event = events::PROBLEM_FRAMED, session_id = %record.id);
                framed
            }
            WorkflowInput::Custom { problem_statement } => problem_statement,
        };
        record.framed_problem = Some(framed.clone());

        let solver_response = self
            .call(
                names::WRITE_SOLVER,
                &context_builders::task_context(&record.task, &framed),
            )
            .await?;
        let script = extract_script(&solver_response);
        if script.trim().is_empty() {
            return Err(WorkflowError::EmptyScript);
        }
        record.solver_script = Some(script.clone());
        info!(
            event = events::SOLVER_GENERATED,
            session_id = %record.id,
            script_bytes = script.len()
        );

        let verdict = self.review_solver(&script).await?;
        record.review_verdict = Some(verdict.clone());
        info!(
            event = events::REVIEW_COMPLETED,
            session_id = %record.id,
            verdict = %verdict
        );

        let solution = if verdict == fields::VERDICT_YES {
            match self.executor.run(&script).await {
                Ok(outcome) if outcome.success() => {
                    record.execution_output = Some(outcome.stdout.clone());
                    record.solution_source = Some(SolutionSource::Executed);
                    info!(
                        event = events::SOLVER_EXECUTED,
                        session_id = %record.id,
                        duration_ms = outcome.duration_ms
                    );

                    let mut context = PromptContext::new();
                    context.insert("problem".to_string(), json!(framed));
                    context.insert("result".to_string(), json!(outcome.stdout));
                    self.call(names::EXPLAIN_SOLUTION, &context).await?
                }
                Ok(outcome) => {
                    warn!(
                        event = events::EXECUTION_FELL_BACK,
                        session_id = %record.id,
                        exit_code = ?outcome.exit_code,
                        stderr = %outcome.stderr,
                        "Solver exited with an error, answering analytically"
                    );
                    self.solve_analytically(record, &framed).await?
                }
                Err(e) => {
                    warn!(
                        event = events::EXECUTION_FELL_BACK,
                        session_id = %record.id,
                        error = %e,
                        "Solver could not run, answering analytically"
                    );
                    self.solve_analytically(record, &framed).await?
                }
            }
        } else {
            self.solve_analytically(record, &framed).await?
        };
        record.solution = Some(solution.clone());

        let mut context = context_builders::task_context(&record.task, &framed);
        context.insert("solution".to_string(), json!(solution));
        let report = self.call(names::WRITE_REPORT, &context).await?;
        record.report = Some(report);
        info!(event = events::REPORT_WRITTEN, session_id = %record.id);

        Ok(())
    }

    async fn solve_analytically(
        &self,
        record: &mut SessionRecord,
        framed: &str,
    ) -> Result<String, WorkflowError> {
        record.solution_source = Some(SolutionSource::Analytical);
        let answer = self
            .call(
                names::SOLVE_ANALYTICALLY,
                &context_builders::task_context(&record.task, framed),
            )
            .await?;
        info!(event = events::ANALYTICAL_SOLUTION, session_id = %record.id);
        Ok(answer)
    }

    async fn review_solver(&self, script: &str) -> Result<String, WorkflowError> {
        let mut context = PromptContext::new();
        context.insert("script".to_string(), json!(script));
        self.prompts.validate_context(names::REVIEW_SOLVER, &context)?;
        let (system_prompt, user_prompt) =
            self.prompts.build_prompt(names::REVIEW_SOLVER, &context)?;

        let response = self
            .llm
            .generate_structured_response_with_fallback(&system_prompt, &user_prompt)
            .await?;

        Ok(response
            .get(fields::VERDICT)
            .and_then(Value::as_str)
            .unwrap_or("no")
            .trim()
            .to_lowercase())
    }

    async fn call(&self, template: &str, context: &PromptContext) -> Result<String, WorkflowError> {
        self.prompts.validate_context(template, context)?;
        let (system_prompt, user_prompt) = self.prompts.build_prompt(template, context)?;
        let response = self
            .llm
            .generate_response_with_fallback(&format!("{system_prompt}\n\n{user_prompt}"))
            .await?;
        Ok(response)
    }
}
