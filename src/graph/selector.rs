//! Label selector matching

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;

pub type Labels = BTreeMap<String, String>;

/// Match a plain `key: value` selector such as a Service's `spec.selector`
///
/// An absent or empty selector selects nothing: a Service without a selector
/// has its endpoints managed by hand and is not tied to any workload.
pub fn map_selector_matches(selector: Option<&Labels>, labels: &Labels) -> bool {
    match selector {
        Some(selector) if !selector.is_empty() => selector
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value)),
        _ => false,
    }
}

/// Match a full `LabelSelector` (matchLabels plus matchExpressions)
///
/// An absent selector selects nothing, an empty one selects everything.
/// Requirements with an unknown operator never match.
pub fn label_selector_matches(selector: Option<&LabelSelector>, labels: &Labels) -> bool {
    let Some(selector) = selector else {
        return false;
    };

    let labels_match = selector
        .match_labels
        .iter()
        .flatten()
        .all(|(key, value)| labels.get(key) == Some(value));

    let expressions_match = selector.match_expressions.iter().flatten().all(|req| {
        let values = req.values.as_deref().unwrap_or_default();
        let current = labels.get(&req.key);
        match req.operator.as_str() {
            "In" => current.is_some_and(|v| values.contains(v)),
            "NotIn" => current.is_none_or(|v| !values.contains(v)),
            "Exists" => current.is_some(),
            "DoesNotExist" => current.is_none(),
            _ => false,
        }
    });

    labels_match && expressions_match
}

/// Render a map selector as a list query (`app=web,tier=frontend`)
pub fn format_map_selector(selector: &Labels) -> String {
    selector
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(",")
}
