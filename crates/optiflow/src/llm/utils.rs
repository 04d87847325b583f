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

use serde_json::Value;
use tracing::{debug, warn};

pub fn extract_json_from_text(text: &str) -> Value {
    debug!("Attempting to extract JSON from text");

    if let Ok(json_val) = serde_json::from_str::<Value>(text) {
        debug!("Successfully parsed entire text as JSON");
        return json_val;
    }

    let code_blocks = extract_code_blocks(text);
    for (language, code_content) in code_blocks {
        if language.as_deref() == Some("json") || language.is_none() {
            if let Ok(json_val) = serde_json::from_str::<Value>(&code_content) {
                debug!("Successfully extracted JSON from markdown code fence");
                return json_val;
            }
        }
    }

    if let Some(json_obj) = find_json_delimiters(text, '{', '}') {
        if let Ok(val) = serde_json::from_str(&json_obj) {
            debug!("Successfully extracted JSON object from text");
            return val;
        }
        warn!(
            "Found JSON-like substring, but it failed to parse: {}",
            json_obj
        );
    }

    if let Some(json_arr) = find_json_delimiters(text, '[', ']') {
        if let Ok(val) = serde_json::from_str(&json_arr) {
            debug!("Successfully extracted JSON array from text");
            return val;
        }
        warn!(
            "Found JSON-like array substring, but it failed to parse: {}",
            json_arr
        );
    }

    warn!("No valid JSON structure found in text, returning fallback response");
    serde_json::json!({
        "response": text.trim(),
        "error": "Failed to parse structured JSON from response."
    })
}

fn find_json_delimiters(text: &str, start_char: char, end_char: char) -> Option<String> {
    let mut balance = 0;
    let mut start_index = None;

    for (i, ch) in text.char_indices() {
        if ch == start_char {
            if balance == 0 {
                start_index = Some(i);
            }
            balance += 1;
        } else if ch == end_char {
            balance -= 1;
            if balance == 0 {
                if let Some(start) = start_index {
                    return Some(text[start..=i].to_string());
                }
            }
        }
    }
    None
}

pub fn extract_code_blocks(text: &str) -> Vec<(Option<String>, String)> {
    let mut code_blocks = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().starts_with("```") {
            let language = {
                let lang_str = line.trim().strip_prefix("```").unwrap_or_default().trim();
                if lang_str.is_empty() {
                    None
                } else {
                    Some(lang_str.to_string())
                }
            };

            let mut code_content = String::new();
            for code_line in lines.by_ref() {
                if code_line.trim().starts_with("```") {
                    break;
                }
                if !code_content.is_empty() {
                    code_content.push('\n');
                }
                code_content.push_str(code_line);
            }
            code_blocks.push((language, code_content));
        }
    }
    code_blocks
}

pub fn extract_script(text: &str) -> String {
    let blocks = extract_code_blocks(text);

    if let Some((_, content)) = blocks
        .iter()
        .find(|(language, _)| matches!(language.as_deref(), Some("python") | Some("py")))
    {
        return content.clone();
    }

    if let Some((_, content)) = blocks.first() {
        return content.clone();
    }

    text.trim().to_string()
}
