//! Translation of [`BugQuery`] into Bugzilla advanced-search parameters.
//!
//! Custom conditions use the numbered `fN`/`oN`/`vN` triples of the REST
//! search. Slots 4 and 5 are only emitted when their exclusion list is
//! non-empty.

use nocrash_core::BugQuery;

/// Query pairs for one page of `query`.
#[must_use]
pub fn search_params(query: &BugQuery, limit: usize, offset: usize) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: String| params.push((key.to_string(), value));

    push("include_fields", query.include_fields.join(","));
    push("resolution", "---".into());
    for status in &query.statuses {
        push("status", status.clone());
    }

    push("f1", "cf_crash_signature".into());
    push("o1", "isnotempty".into());

    push("f2", "creation_ts".into());
    push("o2", "lessthan".into());
    push("v2", query.created_before.to_string());

    push("f3", "days_elapsed".into());
    push("o3", "greaterthan".into());
    push("v3", query.min_days_elapsed.to_string());

    if !query.reporter_exclusions.is_empty() {
        push("f4", "reporter".into());
        push("o4", "nowordssubstr".into());
        push("v4", query.reporter_exclusions.join(","));
    }

    if !query.keyword_exclusions.is_empty() {
        push("f5", "keywords".into());
        push("o5", "nowords".into());
        push("v5", query.keyword_exclusions.join(","));
    }

    if !query.bug_ids.is_empty() {
        let ids: Vec<String> = query.bug_ids.iter().map(ToString::to_string).collect();
        push("id", ids.join(","));
    }

    push("order", "bug_id".into());
    push("limit", limit.to_string());
    push("offset", offset.to_string());
    params
}
