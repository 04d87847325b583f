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

use optiflow::workflow::{SessionRecord, WorkflowConfig};
use optiflow::LlmManager;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<LlmManager>,
    pub workflow_config: WorkflowConfig,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionRecord>>>,
}

impl AppState {
    pub fn new(llm: Arc<LlmManager>, workflow_config: WorkflowConfig) -> Self {
        Self {
            llm,
            workflow_config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
