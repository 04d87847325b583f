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

use optiflow::llm::{extract_code_blocks, extract_json_from_text, extract_script};
use serde_json::json;

#[test]
fn test_extract_json_from_text_object() {
    let text = r#"Here's the verdict {"verdict": "yes", "confidence": 1} and more text"#;
    let result = extract_json_from_text(text);
    assert_eq!(result, json!({"verdict": "yes", "confidence": 1}));
}

#[test]
fn test_extract_json_from_text_array() {
    let text = r#"Some text [1, 2, "test"] more text"#;
    let result = extract_json_from_text(text);
    assert_eq!(result, json!([1, 2, "test"]));
}

#[test]
fn test_extract_json_from_fenced_block() {
    let text = "Sure, here is the verdict:\n```json\n{\"verdict\": \"no\"}\n```\n";
    let result = extract_json_from_text(text);
    assert_eq!(result, json!({"verdict": "no"}));
}

#[test]
fn test_extract_json_fallback() {
    let text = "This is just plain text.";
    let result = extract_json_from_text(text);
    assert_eq!(result["response"], "This is just plain text.");
    assert!(result["error"].is_string());
}

#[test]
fn test_extract_code_blocks() {
    let text = r#"
Here's the solver:
```python
from pulp import LpProblem
print("ok")
```
And a note:
```
plain block
```
"#;
    let blocks = extract_code_blocks(text);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].0, Some("python".to_string()));
    assert_eq!(blocks[0].1, "from pulp import LpProblem\nprint(\"ok\")");
    assert_eq!(blocks[1].0, None);
}

#[test]
fn test_extract_script_prefers_python_block() {
    let text = "```text\nnot code\n```\n```python\nprint(1)\n```";
    assert_eq!(extract_script(text), "print(1)");
}

#[test]
fn test_extract_script_falls_back_to_first_block() {
    let text = "intro\n```\nprint(2)\n```\noutro";
    assert_eq!(extract_script(text), "print(2)");
}

#[test]
fn test_extract_script_uses_raw_text_without_fences() {
    let text = "  print(3)\n";
    assert_eq!(extract_script(text), "print(3)");
}
