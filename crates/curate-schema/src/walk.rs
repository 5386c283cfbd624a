//! Recursive descent over a declared field tree.
//!
//! Both validation paths walk a record against a list of declared fields:
//! the compiled model to normalize it, the structural validator to audit
//! it. They differ in what they do at each field, not in how they find
//! the fields, so the traversal lives here and each path supplies a
//! visitor.
//!
//! Visit order for one object:
//!
//! 1. `Missing` for every required name absent from the object, in the
//!    order the names are declared as required.
//! 2. `Present` or `Absent` for every declared field, in declaration order.
//! 3. `Undeclared` for every object key no field declares, in key order.

use curate_core::{FieldValue, Record};

use crate::path::FieldPath;

/// One step of the descent.
pub(crate) enum Visit<'s, 'o, S> {
    /// A required field is absent.
    Missing { path: FieldPath },
    /// An optional field is absent.
    Absent { name: &'s str, spec: &'s S },
    /// A declared field is present.
    Present {
        path: FieldPath,
        name: &'s str,
        spec: &'s S,
        value: &'o FieldValue,
    },
    /// The object carries a key no field declares.
    Undeclared { path: FieldPath, value: &'o FieldValue },
}

/// Walk one object level, calling `visit` for each step.
pub(crate) fn descend<'s, 'o, S: 's>(
    object: &'o Record,
    path: &FieldPath,
    required: &[&str],
    declared: impl IntoIterator<Item = (&'s str, &'s S)>,
    mut visit: impl FnMut(Visit<'s, 'o, S>),
) {
    let declared: Vec<(&'s str, &'s S)> = declared.into_iter().collect();

    for name in required {
        if !object.contains_key(*name) {
            visit(Visit::Missing {
                path: path.field(name),
            });
        }
    }

    for &(name, spec) in &declared {
        match object.get(name) {
            Some(value) => visit(Visit::Present {
                path: path.field(name),
                name,
                spec,
                value,
            }),
            None if required.iter().any(|r| *r == name) => {}
            None => visit(Visit::Absent { name, spec }),
        }
    }

    for (key, value) in object {
        if !declared.iter().any(|(name, _)| *name == key.as_str()) {
            visit(Visit::Undeclared {
                path: path.field(key),
                value,
            });
        }
    }
}

/// Pair each list item with its indexed path.
pub(crate) fn items<'a>(
    items: &'a [FieldValue],
    path: &'a FieldPath,
) -> impl Iterator<Item = (FieldPath, &'a FieldValue)> + 'a {
    items
        .iter()
        .enumerate()
        .map(move |(i, item)| (path.index(i), item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> Record {
        match FieldValue::from(v) {
            FieldValue::Map(m) => m,
            other => panic!("not a map: {other:?}"),
        }
    }

    fn trace(object: &Record, required: &[&str], declared: &[(&'static str, ())]) -> Vec<String> {
        let mut steps = Vec::new();
        descend(
            object,
            &FieldPath::root().field("root"),
            required,
            declared.iter().map(|(n, s)| (*n, s)),
            |visit| {
                steps.push(match visit {
                    Visit::Missing { path } => format!("missing {path}"),
                    Visit::Absent { name, .. } => format!("absent {name}"),
                    Visit::Present { path, .. } => format!("present {path}"),
                    Visit::Undeclared { path, .. } => format!("undeclared {path}"),
                })
            },
        );
        steps
    }

    #[test]
    fn test_visit_order() {
        let object = record(json!({"b": 1, "zzz": 2}));
        let steps = trace(&object, &["a", "b"], &[("a", ()), ("b", ()), ("c", ())]);
        assert_eq!(
            steps,
            vec![
                "missing root.a",
                "present root.b",
                "absent c",
                "undeclared root.zzz"
            ]
        );
    }

    #[test]
    fn test_required_but_undeclared_is_still_missing() {
        let object = record(json!({}));
        let steps = trace(&object, &["ghost"], &[]);
        assert_eq!(steps, vec!["missing root.ghost"]);
    }

    #[test]
    fn test_items_paths() {
        let list = vec![FieldValue::from("a"), FieldValue::from("b")];
        let base = FieldPath::root().field("keywords");
        let paths: Vec<String> = items(&list, &base).map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, vec!["keywords[0]", "keywords[1]"]);
    }
}
