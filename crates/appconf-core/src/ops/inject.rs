//! Workload back-reference injection into trait bodies

use crate::fieldpath::FieldPathError;
use crate::model::{Reference, Resource};

/// Write `{apiVersion, kind, name}` of `workload` at `path` in the trait body
///
/// `None` or an empty path leaves the body untouched. Any existing value at
/// `path` is replaced; the rest of the body is not modified.
///
/// # Errors
///
/// Returns the attribute error when `path` is malformed or collides with a
/// non-container value in the body.
pub fn inject_workload_ref(
    body: &mut Resource,
    path: Option<&str>,
    workload: &Reference,
) -> Result<(), FieldPathError> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    body.set_value(path, workload.to_typed_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workload() -> Reference {
        Reference::new("workload.oam.dev", "workloadKind", "workload-example")
            .with_namespace("ns")
            .with_uid("workload-uid")
    }

    fn trait_body() -> Resource {
        Resource::new("trait.oam.dev", "traitKind", "trait-example").with_namespace("ns")
    }

    #[test]
    fn test_injects_typed_reference() {
        let mut body = trait_body();
        inject_workload_ref(&mut body, Some("spec.workload.path"), &workload()).unwrap();
        assert_eq!(
            body.get_value("spec.workload.path").unwrap(),
            &json!({
                "apiVersion": "workload.oam.dev",
                "kind": "workloadKind",
                "name": "workload-example",
            })
        );
        assert_eq!(body.name(), "trait-example");
    }

    #[test]
    fn test_no_path_is_noop() {
        let mut body = trait_body();
        inject_workload_ref(&mut body, None, &workload()).unwrap();
        inject_workload_ref(&mut body, Some(""), &workload()).unwrap();
        assert_eq!(body, trait_body());
    }

    #[test]
    fn test_overwrites_previous_reference() {
        let mut body = trait_body();
        body.set_value("spec.workloadRef", json!({"name": "stale", "extra": true}))
            .unwrap();
        inject_workload_ref(&mut body, Some("spec.workloadRef"), &workload()).unwrap();
        assert_eq!(
            body.get_value("spec.workloadRef.name").unwrap(),
            &json!("workload-example")
        );
        assert!(body.get_value("spec.workloadRef.extra").is_err());
    }

    #[test]
    fn test_collision_with_scalar() {
        let mut body = trait_body();
        body.set_value("spec", json!("not-a-map")).unwrap();
        let err = inject_workload_ref(&mut body, Some("spec.workloadRef"), &workload())
            .unwrap_err();
        assert_eq!(err.path(), Some("spec.workloadRef"));
        assert_eq!(body.get_value("spec").unwrap(), &json!("not-a-map"));
    }
}
