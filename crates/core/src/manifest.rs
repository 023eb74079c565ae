use std::collections::BTreeMap;
use std::fmt;

use kube::core::GroupVersionKind;
use kube::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_type, Error, Result};

/// Renderer kind that produced a manifest (e.g. `helm`, `kustomize`).
pub const SOURCE_TYPE_ANNOTATION: &str = "manifold.dev/source-type";
/// Chart, directory or URL the manifest was rendered from.
pub const SOURCE_PATH_ANNOTATION: &str = "manifold.dev/source-path";
/// File inside the source the manifest came from.
pub const SOURCE_FILE_ANNOTATION: &str = "manifold.dev/source-file";

/// One Kubernetes-style manifest object.
///
/// Backed by an ordered JSON object; typed accessors cover the metadata the
/// pipeline cares about and everything else stays schema-free. Missing
/// string fields read as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Manifest {
    object: Map<String, Value>,
}

/// Structural identity of a manifest: kind + namespace + name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} {}", self.kind, self.name)
        } else {
            write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
        }
    }
}

impl Manifest {
    pub fn new(api_version: &str, kind: &str, name: &str) -> Self {
        let mut object = Map::new();
        object.insert("apiVersion".into(), Value::String(api_version.to_string()));
        object.insert("kind".into(), Value::String(kind.to_string()));
        let mut meta = Map::new();
        meta.insert("name".into(), Value::String(name.to_string()));
        object.insert("metadata".into(), Value::Object(meta));
        Self { object }
    }

    /// Convert a typed resource (e.g. a `k8s_openapi` `Pod`) into a manifest.
    /// `apiVersion`/`kind` are filled from the resource type when the
    /// serialized form omits them.
    pub fn from_resource<K>(resource: &K) -> Result<Self>
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let mut m = Self::try_from(serde_json::to_value(resource)?)?;
        if m.api_version().is_empty() {
            m.object.insert("apiVersion".into(), Value::String(K::api_version(&()).into_owned()));
        }
        if m.kind().is_empty() {
            m.object.insert("kind".into(), Value::String(K::kind(&()).into_owned()));
        }
        Ok(m)
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self { self.set_namespace(namespace); self }
    pub fn with_label(mut self, key: &str, value: &str) -> Self { self.set_label(key, value); self }
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self { self.set_annotation(key, value); self }

    pub fn api_version(&self) -> &str { self.top_str("apiVersion") }
    pub fn kind(&self) -> &str { self.top_str("kind") }
    pub fn name(&self) -> &str { self.meta_str("name") }
    pub fn namespace(&self) -> &str { self.meta_str("namespace") }

    /// Group/version/kind split from `apiVersion` (core group is `""`).
    pub fn gvk(&self) -> GroupVersionKind {
        let (group, version) = match self.api_version().split_once('/') {
            Some((g, v)) => (g, v),
            None => ("", self.api_version()),
        };
        GroupVersionKind::gvk(group, version, self.kind())
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef { kind: self.kind().to_string(), namespace: self.namespace().to_string(), name: self.name().to_string() }
    }

    pub fn labels(&self) -> BTreeMap<String, String> { self.string_map("labels") }
    pub fn annotations(&self) -> BTreeMap<String, String> { self.string_map("annotations") }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.meta_map("labels").and_then(|m| m.get(key)).and_then(Value::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.meta_map("annotations").and_then(|m| m.get(key)).and_then(Value::as_str)
    }

    /// RFC 6901 lookup, e.g. `/spec/replicas`.
    ///
    /// The empty pointer (the whole document) returns `None`; read the
    /// whole document through [`Manifest::as_object`] or [`Manifest::to_value`].
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        self.object.get(&key)?.pointer(tail)
    }

    pub fn as_object(&self) -> &Map<String, Value> { &self.object }
    pub fn to_value(&self) -> Value { Value::Object(self.object.clone()) }
    pub fn into_value(self) -> Value { Value::Object(self.object) }

    pub fn set_name(&mut self, name: &str) {
        self.metadata_mut().insert("name".into(), Value::String(name.to_string()));
    }

    /// Empty namespace removes the field.
    pub fn set_namespace(&mut self, namespace: &str) {
        if namespace.is_empty() {
            self.metadata_mut().remove("namespace");
        } else {
            self.metadata_mut().insert("namespace".into(), Value::String(namespace.to_string()));
        }
    }

    /// Replace all labels; an empty map removes the field.
    pub fn set_labels(&mut self, labels: BTreeMap<String, String>) { self.set_string_map("labels", labels) }
    /// Replace all annotations; an empty map removes the field.
    pub fn set_annotations(&mut self, annotations: BTreeMap<String, String>) { self.set_string_map("annotations", annotations) }

    pub fn set_label(&mut self, key: &str, value: &str) { self.insert_string("labels", key, value) }
    pub fn set_annotation(&mut self, key: &str, value: &str) { self.insert_string("annotations", key, value) }

    pub fn remove_label(&mut self, key: &str) {
        let meta = self.metadata_mut();
        let now_empty = match meta.get_mut("labels") {
            Some(Value::Object(m)) => { m.remove(key); m.is_empty() }
            _ => false,
        };
        if now_empty { meta.remove("labels"); }
    }

    fn top_str(&self, key: &str) -> &str {
        self.object.get(key).and_then(Value::as_str).unwrap_or("")
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.object.get("metadata").and_then(Value::as_object)
    }

    fn meta_str(&self, key: &str) -> &str {
        self.metadata().and_then(|m| m.get(key)).and_then(Value::as_str).unwrap_or("")
    }

    fn meta_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.metadata().and_then(|m| m.get(key)).and_then(Value::as_object)
    }

    fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.meta_map(key)
            .map(|m| m.iter().filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string()))).collect())
            .unwrap_or_default()
    }

    fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        object_entry(&mut self.object, "metadata")
    }

    fn set_string_map(&mut self, key: &str, entries: BTreeMap<String, String>) {
        let meta = self.metadata_mut();
        if entries.is_empty() {
            meta.remove(key);
            return;
        }
        let m: Map<String, Value> = entries.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
        meta.insert(key.to_string(), Value::Object(m));
    }

    fn insert_string(&mut self, map_key: &str, key: &str, value: &str) {
        let m = object_entry(self.metadata_mut(), map_key);
        m.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Get `map[key]` as an object, replacing any non-object value.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(m) => m,
        _ => unreachable!("slot was just set to an object"),
    }
}

impl TryFrom<Value> for Manifest {
    type Error = Error;

    fn try_from(v: Value) -> Result<Self> {
        match v {
            Value::Object(object) => Ok(Self { object }),
            other => Err(Error::NotAnObject { got: json_type(&other) }),
        }
    }
}

impl From<Manifest> for Value {
    fn from(m: Manifest) -> Self { m.into_value() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment() -> Manifest {
        Manifest::try_from(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "web",
                "namespace": "prod",
                "labels": { "app": "web", "replicas": 3 },
                "annotations": { "team": "core" }
            },
            "spec": { "replicas": 3, "template": { "spec": { "containers": [ { "name": "c0" } ] } } }
        }))
        .expect("object")
    }

    #[test]
    fn accessors_read_metadata() {
        let d = deployment();
        assert_eq!(d.api_version(), "apps/v1");
        assert_eq!(d.kind(), "Deployment");
        assert_eq!(d.name(), "web");
        assert_eq!(d.namespace(), "prod");
        let gvk = d.gvk();
        assert_eq!((gvk.group.as_str(), gvk.version.as_str(), gvk.kind.as_str()), ("apps", "v1", "Deployment"));
        // non-string label values are ignored
        assert_eq!(d.labels().len(), 1);
        assert_eq!(d.label("app"), Some("web"));
        assert_eq!(d.annotation("team"), Some("core"));
        assert_eq!(d.object_ref().to_string(), "Deployment prod/web");
    }

    #[test]
    fn core_group_has_empty_group() {
        let p = Manifest::new("v1", "Pod", "a");
        let gvk = p.gvk();
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
        assert_eq!(p.namespace(), "");
        assert_eq!(p.object_ref().to_string(), "Pod a");
    }

    #[test]
    fn pointer_walks_objects_and_arrays() {
        let d = deployment();
        assert_eq!(d.pointer("/spec/replicas"), Some(&json!(3)));
        assert_eq!(d.pointer("/spec/template/spec/containers/0/name"), Some(&json!("c0")));
        assert_eq!(d.pointer("/kind"), Some(&json!("Deployment")));
        assert_eq!(d.pointer("/spec/missing"), None);
        assert_eq!(d.pointer("spec"), None);
    }

    #[test]
    fn empty_pointer_is_not_a_field() {
        let d = deployment();
        assert_eq!(d.pointer(""), None);
        assert_eq!(d.to_value().pointer(""), Some(&d.to_value()));
    }

    #[test]
    fn mutators_create_and_remove_fields() {
        let mut p = Manifest::new("v1", "Pod", "a");
        p.set_label("app", "web");
        p.set_annotation("note", "x");
        p.set_namespace("default");
        assert_eq!(p.label("app"), Some("web"));
        assert_eq!(p.annotation("note"), Some("x"));
        assert_eq!(p.namespace(), "default");

        p.remove_label("app");
        assert!(p.pointer("/metadata/labels").is_none());
        p.set_annotations(BTreeMap::new());
        assert!(p.pointer("/metadata/annotations").is_none());
        p.set_namespace("");
        assert!(p.pointer("/metadata/namespace").is_none());
        p.set_name("b");
        assert_eq!(p.name(), "b");
    }

    #[test]
    fn rejects_non_objects() {
        let err = Manifest::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::NotAnObject { got: "array" }));
        assert!(serde_json::from_value::<Manifest>(json!("pod")).is_err());
    }

    #[test]
    fn serde_is_transparent_and_ordered() {
        let d = deployment();
        let text = serde_json::to_string(&d).expect("serialize");
        assert!(text.starts_with(r#"{"apiVersion":"apps/v1","kind":"Deployment""#), "text={}", text);
        let back: Manifest = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, d);
    }
}
