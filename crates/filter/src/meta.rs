//! Filters over manifest metadata.

use manifold_core::{filter_fn, SharedFilter, SOURCE_TYPE_ANNOTATION};

fn owned(values: &[&str]) -> Vec<String> { values.iter().map(|s| s.to_string()).collect() }

/// Matches any of the given kinds.
pub fn kind(kinds: &[&str]) -> SharedFilter {
    let kinds = owned(kinds);
    filter_fn(move |_, doc| Ok(kinds.iter().any(|k| k == doc.kind())))
}

pub fn api_version(api_version: &str) -> SharedFilter {
    let want = api_version.to_string();
    filter_fn(move |_, doc| Ok(doc.api_version() == want))
}

/// Exact group/version/kind match; an empty component matches anything.
pub fn gvk(group: &str, version: &str, kind: &str) -> SharedFilter {
    let (group, version, kind) = (group.to_string(), version.to_string(), kind.to_string());
    filter_fn(move |_, doc| {
        let g = doc.gvk();
        Ok((group.is_empty() || g.group == group)
            && (version.is_empty() || g.version == version)
            && (kind.is_empty() || g.kind == kind))
    })
}

/// Matches any of the given names.
pub fn name(names: &[&str]) -> SharedFilter {
    let names = owned(names);
    filter_fn(move |_, doc| Ok(names.iter().any(|n| n == doc.name())))
}

/// Matches any of the given namespaces; `""` selects cluster-scoped or
/// unset-namespace manifests.
pub fn namespace(namespaces: &[&str]) -> SharedFilter {
    let namespaces = owned(namespaces);
    filter_fn(move |_, doc| Ok(namespaces.iter().any(|n| n == doc.namespace())))
}

pub fn has_label(key: &str) -> SharedFilter {
    let key = key.to_string();
    filter_fn(move |_, doc| Ok(doc.label(&key).is_some()))
}

pub fn label(key: &str, value: &str) -> SharedFilter {
    let (key, value) = (key.to_string(), value.to_string());
    filter_fn(move |_, doc| Ok(doc.label(&key) == Some(value.as_str())))
}

pub fn annotation(key: &str, value: &str) -> SharedFilter {
    let (key, value) = (key.to_string(), value.to_string());
    filter_fn(move |_, doc| Ok(doc.annotation(&key) == Some(value.as_str())))
}

/// Manifests stamped by a renderer of the given type.
pub fn source_type(source_type: &str) -> SharedFilter {
    annotation(SOURCE_TYPE_ANNOTATION, source_type)
}
