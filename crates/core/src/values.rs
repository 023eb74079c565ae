use serde_json::{Map, Value};

/// Value bag handed to renderers.
pub type Values = Map<String, Value>;

/// Deep merge `overlay` onto `base`. Nested objects merge key by key;
/// anything else in `overlay` (scalars, arrays, null) replaces the base value.
pub fn merge_values(base: &Values, overlay: &Values) -> Values {
    let mut out = base.clone();
    merge_into(&mut out, overlay);
    out
}

fn merge_into(dst: &mut Values, overlay: &Values) {
    for (k, v) in overlay {
        match (dst.get_mut(k), v) {
            (Some(Value::Object(d)), Value::Object(o)) => merge_into(d, o),
            _ => { dst.insert(k.clone(), v.clone()); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Values {
        match v { Value::Object(m) => m, _ => panic!("not an object") }
    }

    #[test]
    fn overlay_wins_on_scalars_and_arrays() {
        let base = values(json!({ "replicas": 1, "ports": [80, 443], "name": "web" }));
        let overlay = values(json!({ "replicas": 3, "ports": [8080] }));
        let merged = merge_values(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({ "replicas": 3, "ports": [8080], "name": "web" }));
    }

    #[test]
    fn nested_objects_merge_deeply() {
        let base = values(json!({ "image": { "repo": "nginx", "tag": "1.0" }, "env": "dev" }));
        let overlay = values(json!({ "image": { "tag": "2.0" } }));
        let merged = merge_values(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({ "image": { "repo": "nginx", "tag": "2.0" }, "env": "dev" }));
    }

    #[test]
    fn object_replaces_scalar_and_vice_versa() {
        let base = values(json!({ "a": 1, "b": { "x": 1 } }));
        let overlay = values(json!({ "a": { "y": 2 }, "b": null }));
        let merged = merge_values(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({ "a": { "y": 2 }, "b": null }));
    }

    #[test]
    fn empty_sides_are_identity() {
        let v = values(json!({ "k": "v" }));
        assert_eq!(merge_values(&v, &Values::new()), v);
        assert_eq!(merge_values(&Values::new(), &v), v);
    }
}
