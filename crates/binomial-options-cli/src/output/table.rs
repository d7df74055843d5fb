use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_result, format_value, lattice_rows};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", value);
        return;
    };
    let Some(result) = envelope.get("result") else {
        print_fields(envelope);
        return;
    };

    if let Value::Object(res_map) = result {
        print_fields(res_map);
    }

    if let Some(rows) = lattice_rows(result) {
        println!("\nPrice lattice (row = step, column = down-moves):");
        print_lattice(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_result(map) {
        builder.push_record([key, format_value(&val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_lattice(rows: &[Value]) {
    let width = rows.len();
    let mut builder = Builder::default();
    let mut header = vec!["step".to_string()];
    header.extend((0..width).map(|j| j.to_string()));
    builder.push_record(header);

    for (step, row) in rows.iter().enumerate() {
        let mut record = vec![step.to_string()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(|c| match c.as_f64() {
                Some(p) => format!("{:.2}", p),
                None => format_value(c),
            }));
        }
        record.resize(width + 1, String::new());
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}
