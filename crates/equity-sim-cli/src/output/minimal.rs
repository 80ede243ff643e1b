use serde_json::Value;

/// Headline fields, most specific first. `net_after_tax` outranks `profit`
/// so an estimate prints what the holder keeps.
const PRIORITY_KEYS: [&str; 6] = [
    "best_profit_id",
    "net_after_tax",
    "tax_paid",
    "profit",
    "vested_profit",
    "equity_value",
];

/// Print just the key answer value from the output.
///
/// Looks for the priority fields in the result, then in nested objects
/// (an estimate keeps its figures under `estimate.tax`), then falls back to
/// the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(found) = PRIORITY_KEYS.iter().find_map(|k| find_key(result_obj, k)) {
        println!("{}", format_minimal(found));
        return;
    }

    match result_obj {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        Value::Array(arr) => {
            let codes: Vec<String> = arr
                .iter()
                .map(|item| item.get("code").map(format_minimal).unwrap_or_else(|| format_minimal(item)))
                .collect();
            println!("{}", codes.join(" "));
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    if let Some(v) = map.get(key).filter(|v| !v.is_null()) {
        return Some(v);
    }
    map.values().filter(|v| v.is_object()).find_map(|v| find_key(v, key))
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
