use serde_json::Value;

use super::types::{Predicate, SqlParam, ID_FIELD};

/// Renders a [`Predicate`] into a parameterized WHERE clause over a
/// `("id" TEXT, "document" JSONB)` table, and evaluates it against in-memory
/// documents with the same semantics.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(predicate: Option<&Predicate>, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = match predicate {
            Some(p) => filter_where.build(p),
            None => "TRUE".to_string(),
        };
        (sql, filter_where.param_values)
    }

    fn build(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Eq { field, value } if field == ID_FIELD => {
                format!("\"id\" = {}", self.param(SqlParam::Text(value.clone())))
            }
            Predicate::Eq { field, value } => {
                let path = self.param(SqlParam::Path(field_path(field)));
                let value = self.param(SqlParam::Text(value.clone()));
                format!("(\"document\" #>> {}::text[]) = {}", path, value)
            }
            Predicate::And(clauses) if clauses.is_empty() => "TRUE".to_string(),
            Predicate::And(clauses) => {
                let parts: Vec<String> = clauses.iter().map(|c| format!("({})", self.build(c))).collect();
                parts.join(" AND ")
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// In-memory evaluation, matching the text comparison done by `#>>`.
    pub fn matches(predicate: &Predicate, document: &Value) -> bool {
        match predicate {
            Predicate::Eq { field, value } => {
                lookup(document, field).and_then(json_text).as_deref() == Some(value.as_str())
            }
            Predicate::And(clauses) => clauses.iter().all(|c| Self::matches(c, document)),
        }
    }
}

/// Split dotted field names into a JSON path (`wound.current`).
pub fn field_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

pub fn lookup<'a>(document: &'a Value, field: &str) -> Option<&'a Value> {
    field.split('.').try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Text form of a JSON value as Postgres renders it for `->>`; null has none.
pub fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
