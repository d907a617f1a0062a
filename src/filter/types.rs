use serde::{Deserialize, Serialize};

pub const PAGE_NUMBER_PARAM: &str = "pageNumber";
pub const PAGE_COUNT_PARAM: &str = "pageCount";
pub const SORT_PARAM: &str = "sort";

/// "Effectively unlimited" page size.
pub const DEFAULT_PAGE_COUNT: i64 = 10000;
pub const DEFAULT_SORT: &str = "priority";

/// Identifier field of a stored document.
pub const ID_FIELD: &str = "_id";
pub const NAME_FIELD: &str = "name";

/// Boolean filter over document fields. An `And` with no clauses matches
/// every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Eq { field: String, value: String },
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq { field: field.into(), value: value.into() }
    }

    pub fn and(clauses: Vec<Predicate>) -> Self {
        Predicate::And(clauses)
    }

    pub fn match_all() -> Self {
        Predicate::And(vec![])
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::And(clauses) if clauses.iter().all(Predicate::is_match_all))
    }

    /// Number of top-level clauses.
    pub fn clause_count(&self) -> usize {
        match self {
            Predicate::Eq { .. } => 1,
            Predicate::And(clauses) => clauses.len(),
        }
    }
}

/// Normalized read request: paging, sort and an optional predicate.
/// `predicate == None` means no filter is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub page_number: i64,
    pub page_count: i64,
    pub sort: String,
    pub predicate: Option<Predicate>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_count: DEFAULT_PAGE_COUNT,
            sort: DEFAULT_SORT.to_string(),
            predicate: None,
        }
    }
}

impl QueryFilter {
    /// Documents to skip: `(pageNumber - 1) * pageCount` once paging applies.
    pub fn skip(&self) -> u64 {
        if self.page_number > 0 {
            let skip = (self.page_number - 1).saturating_mul(self.page_count);
            u64::try_from(skip).unwrap_or(0)
        } else {
            0
        }
    }

    /// Maximum documents to return; a zero page count means no limit.
    pub fn limit(&self) -> Option<u64> {
        match self.page_count.unsigned_abs() {
            0 => None,
            n => Some(n),
        }
    }
}

/// Bound value for generated SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Path(Vec<String>),
}
