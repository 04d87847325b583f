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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> &mut Self {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
        self
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push('|');
        for column in &self.columns {
            out.push_str(&format!(" {column} |"));
        }
        out.push('\n');
        out.push('|');
        for _ in &self.columns {
            out.push_str(" --- |");
        }
        out.push('\n');
        for row in &self.rows {
            out.push('|');
            for cell in row {
                out.push_str(&format!(" {cell} |"));
            }
            out.push('\n');
        }
        out
    }
}

pub fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_rendering() {
        let mut table = DataTable::new("Demand", columns(&["Customer Name", "Demand (Units)"]));
        table.push_row(vec!["Customer_Alice".into(), CellValue::Int(120)]);
        table.push_row(vec!["Customer_Bob".into(), CellValue::Int(87)]);

        let md = table.to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| Customer Name | Demand (Units) |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| Customer_Alice | 120 |");
        assert_eq!(lines[3], "| Customer_Bob | 87 |");
    }

    #[test]
    fn test_float_cells_render_with_two_decimals() {
        let mut table = DataTable::new("Risk", columns(&["Supplier", "Risk Score (0-1)"]));
        table.push_row(vec!["Supplier_Acme".into(), CellValue::Float(0.456_789)]);
        assert!(table.to_markdown().contains("| 0.46 |"));
    }

    #[test]
    fn test_cell_values_serialise_untagged() {
        let row = vec![
            CellValue::Text("Plant_Leeds".into()),
            CellValue::Int(300),
            CellValue::Float(0.5),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[\"Plant_Leeds\",300,0.5]");
    }
}
