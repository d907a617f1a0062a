use std::cmp::Ordering;

use serde_json::Value;

use super::filter_where::{field_path, lookup};
use super::types::{SqlParam, ID_FIELD};

/// Ascending single-field sort.
pub struct FilterOrder;

impl FilterOrder {
    /// ORDER BY clause for `sort`, numbering its parameter after `param_index`.
    /// Ties are broken by id so paging is stable.
    pub fn generate(sort: &str, param_index: usize) -> (String, Vec<SqlParam>) {
        if sort.is_empty() || sort == ID_FIELD {
            return ("ORDER BY \"id\" ASC".to_string(), vec![]);
        }
        (
            format!("ORDER BY \"document\" #> ${}::text[] ASC, \"id\" ASC", param_index + 1),
            vec![SqlParam::Path(field_path(sort))],
        )
    }

    /// In-memory counterpart of the jsonb ordering: missing values sort last.
    pub fn compare(a: &Value, b: &Value, sort: &str) -> Ordering {
        if sort.is_empty() || sort == ID_FIELD {
            return id_of(a).cmp(&id_of(b));
        }
        let left = lookup(a, sort).filter(|v| !v.is_null());
        let right = lookup(b, sort).filter(|v| !v.is_null());
        match (left, right) {
            (Some(l), Some(r)) => compare_values(l, r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| id_of(a).cmp(&id_of(b)))
    }
}

fn id_of(v: &Value) -> &str {
    v.get(ID_FIELD).and_then(Value::as_str).unwrap_or("")
}

// jsonb orders by type first: string < number < boolean < array < object.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Number(l), Value::Number(r)) => {
            let l = l.as_f64().unwrap_or(0.0);
            let r = r.as_f64().unwrap_or(0.0);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => type_rank(a).cmp(&type_rank(b)).then_with(|| a.to_string().cmp(&b.to_string())),
    }
}
