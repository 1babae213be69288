use serde_json::Value;

/// Coerce a loosely typed flag into a strict bool.
/// Ghost wrote `page`/`featured` as JSON booleans in some versions and as 0/1 in others.
/// Anything that is neither (null, string, float, object) is `false`.
pub fn coerce_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i != 0,
            (None, Some(u)) => u != 0,
            _ => false,
        },
        _ => false,
    }
}
