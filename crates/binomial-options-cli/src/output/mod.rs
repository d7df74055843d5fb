pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::LatticeCsv => csv_out::print_lattice_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of a result, nested objects joined with '.'. The lattice is left out.
pub fn flatten_result(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, rows: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        if key == "lattice" {
            continue;
        }
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows),
            _ => rows.push((name, val.clone())),
        }
    }
}

/// Price lattice rows from `result.lattice` or `result.pricing.lattice`.
pub fn lattice_rows(result: &Value) -> Option<&Vec<Value>> {
    result
        .get("lattice")
        .or_else(|| result.get("pricing").and_then(|p| p.get("lattice")))
        .and_then(Value::as_array)
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
