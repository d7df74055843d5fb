use serde_json::{Map, Value};

/// Print just the key answer: call and put prices when present, otherwise
/// the first well-known field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let priced = map.get("pricing").and_then(Value::as_object).unwrap_or(map);
        if let Some(line) = call_put_line(priced) {
            println!("{}", line);
            return;
        }

        for key in ["volatility", "value", "delta"] {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn call_put_line(map: &Map<String, Value>) -> Option<String> {
    let call = map.get("call_price")?.as_f64()?;
    let put = map.get("put_price")?.as_f64()?;
    Some(format!("call {:.2} put {:.2}", call, put))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
