use std::collections::HashSet;

use super::types::{
    Predicate, QueryFilter, ID_FIELD, NAME_FIELD, PAGE_COUNT_PARAM, PAGE_NUMBER_PARAM, SORT_PARAM,
};
use crate::types::ObjectId;

/// Build paging, sort and predicate from raw query-string pairs.
///
/// Reserved keys are `pageNumber`, `pageCount` and `sort`; numeric values that
/// fail to parse become 0. Every other key becomes an equality clause. When a
/// key repeats, its first value wins.
pub fn build_filter(query_params: &[(String, String)]) -> QueryFilter {
    let mut filter = QueryFilter::default();
    if query_params.is_empty() {
        return filter;
    }

    let mut seen = HashSet::new();
    let mut clauses = Vec::new();
    for (key, value) in query_params {
        if !seen.insert(key.as_str()) {
            continue;
        }
        match key.as_str() {
            PAGE_NUMBER_PARAM => filter.page_number = value.parse().unwrap_or(0),
            PAGE_COUNT_PARAM => filter.page_count = value.parse().unwrap_or(0),
            SORT_PARAM => filter.sort = value.clone(),
            _ => clauses.push(Predicate::eq(key.clone(), value.clone())),
        }
    }

    filter.predicate = if clauses.is_empty() { None } else { Some(Predicate::and(clauses)) };
    filter
}

/// AND together an id clause, a name clause and any extra predicates.
/// Returns the match-everything predicate when nothing is supplied.
pub fn build_query(id: Option<&ObjectId>, name: Option<&str>, other: Vec<Predicate>) -> Predicate {
    let mut conditions = Vec::new();
    if let Some(id) = id {
        conditions.push(Predicate::eq(ID_FIELD, id.to_hex()));
    }
    if let Some(name) = name {
        conditions.push(Predicate::eq(NAME_FIELD, name));
    }
    conditions.extend(other);

    if conditions.is_empty() {
        Predicate::match_all()
    } else {
        Predicate::and(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{DEFAULT_PAGE_COUNT, DEFAULT_SORT};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn no_params_uses_defaults() {
        let f = build_filter(&[]);
        assert_eq!(f.page_number, 0);
        assert_eq!(f.page_count, DEFAULT_PAGE_COUNT);
        assert_eq!(f.sort, DEFAULT_SORT);
        assert!(f.predicate.is_none());
        assert_eq!(f.skip(), 0);
    }

    #[test]
    fn reserved_only_yields_no_predicate() {
        let f = build_filter(&params(&[("pageNumber", "3"), ("pageCount", "20"), ("sort", "species")]));
        assert_eq!(f.page_number, 3);
        assert_eq!(f.page_count, 20);
        assert_eq!(f.sort, "species");
        assert!(f.predicate.is_none());
        assert_eq!(f.skip(), 40);
        assert_eq!(f.limit(), Some(20));
    }

    #[test]
    fn non_numeric_paging_becomes_zero() {
        let f = build_filter(&params(&[("pageNumber", "two"), ("pageCount", "lots")]));
        assert_eq!(f.page_number, 0);
        assert_eq!(f.page_count, 0);
        assert_eq!(f.skip(), 0);
        assert_eq!(f.limit(), None);
        // the default sort survives when only paging keys are present
        assert_eq!(f.sort, DEFAULT_SORT);
    }

    #[test]
    fn field_params_become_conjunction() {
        let f = build_filter(&params(&[
            ("species", "Twi'lek"),
            ("pageCount", "5"),
            ("career", "Consular"),
        ]));
        let predicate = f.predicate.expect("predicate");
        assert_eq!(predicate.clause_count(), 2);
        assert_eq!(
            predicate,
            Predicate::and(vec![
                Predicate::eq("species", "Twi'lek"),
                Predicate::eq("career", "Consular"),
            ])
        );
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let f = build_filter(&params(&[("species", "Human"), ("species", "Wookiee"), ("sort", "a"), ("sort", "b")]));
        assert_eq!(f.predicate, Some(Predicate::and(vec![Predicate::eq("species", "Human")])));
        assert_eq!(f.sort, "a");
    }

    #[test]
    fn first_page_skips_nothing() {
        let f = build_filter(&params(&[("pageNumber", "1"), ("pageCount", "25")]));
        assert_eq!(f.skip(), 0);
    }

    #[test]
    fn build_query_combines_inputs() {
        let id = ObjectId::parse_hex("5b883e25ad3d111aa02b4693").unwrap();
        let q = build_query(Some(&id), Some("Kira"), vec![Predicate::eq("species", "Human")]);
        assert_eq!(
            q,
            Predicate::and(vec![
                Predicate::eq("_id", "5b883e25ad3d111aa02b4693"),
                Predicate::eq("name", "Kira"),
                Predicate::eq("species", "Human"),
            ])
        );
    }

    #[test]
    fn build_query_without_inputs_matches_everything() {
        let q = build_query(None, None, vec![]);
        assert!(q.is_match_all());
        assert_eq!(q.clause_count(), 0);
    }
}
