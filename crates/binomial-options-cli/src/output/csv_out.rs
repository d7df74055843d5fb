use serde_json::Value;
use std::io;

use super::{flatten_result, format_value, lattice_rows};

/// Write the result as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    match result {
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in flatten_result(map) {
                let _ = wtr.write_record([key, format_value(&val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([format_value(result)]);
        }
    }
    let _ = wtr.flush();
}

/// Lattice nodes as `step,down_moves,price` rows.
pub fn print_lattice_csv(value: &Value) {
    let result = value.get("result").unwrap_or(value);
    let Some(rows) = lattice_rows(result) else {
        return;
    };
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["step", "down_moves", "price"]);
    for (step, row) in rows.iter().enumerate() {
        if let Value::Array(cells) = row {
            for (j, cell) in cells.iter().enumerate() {
                let _ = wtr.write_record([step.to_string(), j.to_string(), format_value(cell)]);
            }
        }
    }
    let _ = wtr.flush();
}
