//! Transformers over manifest metadata. Each returns a modified copy.

use manifold_core::{transformer_fn, SharedTransformer};

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Add or overwrite labels, keeping the others.
pub fn set_labels(labels: &[(&str, &str)]) -> SharedTransformer {
    let labels = pairs(labels);
    transformer_fn(move |_, doc| {
        let mut out = doc.clone();
        for (k, v) in &labels {
            out.set_label(k, v);
        }
        Ok(out)
    })
}

/// Add or overwrite annotations, keeping the others.
pub fn set_annotations(annotations: &[(&str, &str)]) -> SharedTransformer {
    let annotations = pairs(annotations);
    transformer_fn(move |_, doc| {
        let mut out = doc.clone();
        for (k, v) in &annotations {
            out.set_annotation(k, v);
        }
        Ok(out)
    })
}

/// Force a namespace; `""` clears it.
pub fn set_namespace(namespace: &str) -> SharedTransformer {
    let namespace = namespace.to_string();
    transformer_fn(move |_, doc| {
        let mut out = doc.clone();
        out.set_namespace(&namespace);
        Ok(out)
    })
}

pub fn remove_labels(keys: &[&str]) -> SharedTransformer {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    transformer_fn(move |_, doc| {
        let mut out = doc.clone();
        for k in &keys {
            out.remove_label(k);
        }
        Ok(out)
    })
}
