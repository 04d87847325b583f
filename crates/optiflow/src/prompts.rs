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

use llm_contracts::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub description: String,
    pub system_template: String,
    pub user_template: String,
    pub variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(
        name: impl Into<String>,
        system_template: impl Into<String>,
        user_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            system_template: system_template.into(),
            user_template: user_template.into(),
            variables: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }
}

pub type PromptContext = HashMap<String, Value>;

#[derive(Debug, Default)]
pub struct PromptLibrary {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimisation_templates() -> Self {
        let mut library = Self::new();
        library.add_optimisation_templates();
        library
    }

    pub fn add_template(&mut self, template: PromptTemplate) -> &mut Self {
        self.templates.insert(template.name.clone(), template);
        self
    }

    pub fn build_prompt(
        &self,
        template_name: &str,
        context: &PromptContext,
    ) -> LlmResult<(String, String)> {
        let template = self.templates.get(template_name).ok_or_else(|| {
            LlmError::Configuration(format!("Template '{template_name}' not found"))
        })?;

        let system_prompt = substitute_variables(&template.system_template, context);
        let user_prompt = substitute_variables(&template.user_template, context);

        debug!(
            "Built prompt from template '{}' with {} context variables",
            template_name,
            context.len()
        );
        Ok((system_prompt, user_prompt))
    }

    pub fn list_templates(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn get_template(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    pub fn validate_context(&self, template_name: &str, context: &PromptContext) -> LlmResult<()> {
        let template = self.templates.get(template_name).ok_or_else(|| {
            LlmError::Configuration(format!("Template '{template_name}' not found"))
        })?;

        let missing_vars: Vec<&String> = template
            .variables
            .iter()
            .filter(|var| !context.contains_key(*var))
            .collect();

        if !missing_vars.is_empty() {
            return Err(LlmError::Configuration(format!(
                "Missing required variables for template '{template_name}': {missing_vars:?}"
            )));
        }

        Ok(())
    }

    pub fn add_optimisation_templates(&mut self) {
        self.add_template(
            PromptTemplate::new(
                names::FRAME_PROBLEM,
                "You are a supply chain analyst who turns raw scenario data into an \
                 optimisation brief. I will give you the name of an optimisation task and its \
                 input data as tables, and you will generate only the following information and \
                 nothing else: Given Data, Problem Statement, Objective, Constraints.",
                r#"Optimisation Task:
{{task}}

Data:
{{data}}

Output must follow this format:

Given Data:
[Write the data here in natural language]

Problem Statement:
[Write the problem being faced according to the given data]

Objective:
[The objective to optimise, phrased as a question]

Constraints:
[Numbered list of constraints]"#,
            )
            .with_description("Turn scenario data tables into an optimisation brief")
            .with_variables(vec!["task".to_string(), "data".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::NARRATE_DATA,
                "I will give you predicted data tables for a supply chain scenario. Describe \
                 the predicted data in plain natural language, nothing else.",
                r#"Predictions:
{{data}}"#,
            )
            .with_description("Describe generated tables in natural language")
            .with_variables(vec!["data".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::WRITE_SOLVER,
                "Act as a Python developer. Write a script that solves the given optimisation \
                 task with the PuLP library. Include every import the script needs, make sure \
                 there are no syntax or logical errors, and always print the optimisation \
                 results. If no optimal solution exists the script must print 'No optimal \
                 solution found.'. Output only code and nothing else.",
                r#"Optimisation Task:
{{task}}

Problem Statement, Objective and Constraints:
{{problem}}

Code:"#,
            )
            .with_description("Generate a PuLP solver script for the framed problem")
            .with_variables(vec!["task".to_string(), "problem".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::REVIEW_SOLVER,
                r#"You are an expert Python code reviewer. I will give you a script that solves an optimisation problem with the PuLP library. Check that the script:

1. includes all the libraries it uses,
2. has no syntax errors,
3. has no logical errors,
4. prints its results.

Respond with ONLY valid JSON in this exact format, with no additional text:

{"verdict": "yes"}

The verdict field MUST be "yes" if the script passes every check and "no" otherwise."#,
                r#"Code:
{{script}}

Verdict:"#,
            )
            .with_description("Binary review verdict on a generated solver script")
            .with_variables(vec!["script".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::SOLVE_ANALYTICALLY,
                "Act as an expert in mathematics and linear programming who solves \
                 optimisation problems computationally with perfect calculations. Understand \
                 the problem from its statement, objective and constraints, perform the \
                 calculation, and output only the answer to the objective.",
                r#"Optimisation Task:
{{task}}

Problem Statement, Objective and Constraints:
{{problem}}

Answer:"#,
            )
            .with_description("Direct analytical answer when the script is rejected")
            .with_variables(vec!["task".to_string(), "problem".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::EXPLAIN_SOLUTION,
                "I will give you an optimisation problem that was solved with the PuLP linear \
                 programming library. Answer the objective and problem statement by looking at \
                 the optimisation results. Do not output anything extra.",
                r#"Optimisation Problem:
{{problem}}

Optimal Results:
{{result}}"#,
            )
            .with_description("Answer the objective from raw solver output")
            .with_variables(vec!["problem".to_string(), "result".to_string()]),
        );

        self.add_template(
            PromptTemplate::new(
                names::WRITE_REPORT,
                "You are an expert report writer whose reports anyone can understand. Use \
                 plain English and clear formatting; never use LaTeX or other markup for \
                 calculations. A colleague solved an optimisation problem and gives you the \
                 task, the problem statement with objective and constraints, and the result. \
                 In the report: explain the given data, explain the solution and calculations, \
                 write a conclusion with respect to the objective, and give suggestions as an \
                 expert.",
                r#"Optimisation Problem:
{{task}}

Problem Statement, Objective and Constraints:
{{problem}}

Result of solving the problem:
{{solution}}

Report:
[Write the report here, formatted as markdown]"#,
            )
            .with_description("Narrative markdown report for the finished run")
            .with_variables(vec![
                "task".to_string(),
                "problem".to_string(),
                "solution".to_string(),
            ]),
        );
    }
}

pub mod names {
    pub const FRAME_PROBLEM: &str = "frame_problem";
    pub const NARRATE_DATA: &str = "narrate_data";
    pub const WRITE_SOLVER: &str = "write_solver";
    pub const REVIEW_SOLVER: &str = "review_solver";
    pub const SOLVE_ANALYTICALLY: &str = "solve_analytically";
    pub const EXPLAIN_SOLUTION: &str = "explain_solution";
    pub const WRITE_REPORT: &str = "write_report";
}

fn substitute_variables(template: &str, context: &PromptContext) -> String {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{key}}}}}");
        let substitution = value_to_string(value);
        result = result.replace(&placeholder, &substitution);
    }

    if result.contains("{{") && result.contains("}}") {
        warn!("Template contains unsubstituted placeholders: {}", result);
    }

    result
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "invalid_json".to_string())
        }
    }
}

pub mod context_builders {
    use super::PromptContext;
    use serde_json::json;

    pub fn task_context(task: &str, problem: &str) -> PromptContext {
        let mut context = PromptContext::new();
        context.insert("task".to_string(), json!(task));
        context.insert("problem".to_string(), json!(problem));
        context
    }

    pub fn data_context(task: &str, data: &str) -> PromptContext {
        let mut context = PromptContext::new();
        context.insert("task".to_string(), json!(task));
        context.insert("data".to_string(), json!(data));
        context
    }
}
