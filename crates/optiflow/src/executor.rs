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

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub extension: String,
    pub timeout_secs: u64,
    pub work_dir: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: Vec::new(),
            extension: "py".to_string(),
            timeout_secs: 10,
            work_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to stage or launch script: {0}")]
    Io(#[from] std::io::Error),

    #[error("script execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

pub struct ScriptExecutor {
    config: ExecutorConfig,
}

impl ScriptExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn run(&self, script: &str) -> Result<ExecutionOutcome, ExecutorError> {
        let mut scratch: Option<TempDir> = None;
        let dir = match &self.config.work_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                dir.clone()
            }
            None => {
                let tmp = TempDir::new()?;
                let path = tmp.path().to_path_buf();
                scratch = Some(tmp);
                path
            }
        };

        let digest = md5::compute(script.as_bytes());
        let script_path = dir.join(format!("tmp_code_{digest:x}.{}", self.config.extension));
        tokio::fs::write(&script_path, script).await?;
        debug!(path = %script_path.display(), "Staged generated script");

        let start = Instant::now();
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(&script_path)
            .current_dir(&dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn()?;
        let output = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ExecutorError::Timeout {
            seconds: self.config.timeout_secs,
        })??;

        let outcome = ExecutionOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            exit_code = ?outcome.exit_code,
            duration_ms = outcome.duration_ms,
            "Script execution finished"
        );

        drop(scratch);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_executor(timeout_secs: u64) -> ScriptExecutor {
        ScriptExecutor::new(ExecutorConfig {
            program: "sh".to_string(),
            args: Vec::new(),
            extension: "sh".to_string(),
            timeout_secs,
            work_dir: None,
        })
    }

    #[tokio::test]
    async fn test_captures_stdout_of_successful_script() {
        let outcome = shell_executor(5).run("echo objective reached").await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "objective reached");
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_success() {
        let outcome = shell_executor(5)
            .run("echo infeasible >&2\nexit 3")
            .await
            .unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.stderr.contains("infeasible"));
    }

    #[tokio::test]
    async fn test_timeout_kills_long_running_script() {
        let err = shell_executor(1).run("sleep 10").await.unwrap_err();
        match err {
            ExecutorError::Timeout { seconds } => assert_eq!(seconds, 1),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_honours_explicit_work_dir() {
        let keep = TempDir::new().unwrap();
        let executor = ScriptExecutor::new(ExecutorConfig {
            program: "sh".to_string(),
            args: Vec::new(),
            extension: "sh".to_string(),
            timeout_secs: 5,
            work_dir: Some(keep.path().to_path_buf()),
        });

        executor.run("echo staged").await.unwrap();
        let staged: Vec<_> = std::fs::read_dir(keep.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(staged.iter().any(|name| name.starts_with("tmp_code_")));
    }
}
