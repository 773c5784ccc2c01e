//! Field-mask resolution for partial updates.

use crate::core::{ColumnRole, Error, Result, Value};
use crate::resource::Resource;

/// Column names that can never appear in an update, regardless of the
/// descriptor. Server-managed timestamp columns are silently filtered from
/// the requested paths.
const NON_UPDATABLE_FIELDS: [&str; 2] = ["create_time", "update_time"];

fn is_non_updatable<R: Resource>(path: &str) -> bool {
    if NON_UPDATABLE_FIELDS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(path))
    {
        return true;
    }
    matches!(
        R::descriptor().get_column(path).map(|col| col.role),
        Some(ColumnRole::CreateTime) | Some(ColumnRole::UpdateTime)
    )
}

/// Drops the fixed non-updatable column names from a requested path list.
pub fn filter_paths<'a, R: Resource>(paths: &[&'a str]) -> Vec<&'a str> {
    paths
        .iter()
        .copied()
        .filter(|p| !is_non_updatable::<R>(p))
        .collect()
}

/// Resolves the requested "set" and "set-to-null" paths into a single
/// column assignment mapping.
///
/// Set paths map to the resource's current in-memory value, null paths to an
/// explicit NULL. The two lists must be disjoint, and after the fixed
/// non-updatable columns are filtered out every remaining path must name a
/// real column.
pub fn resolve_update_fields<R: Resource>(
    resource: &R,
    set_paths: &[&str],
    null_paths: &[&str],
) -> Result<Vec<(String, Value)>> {
    const OP: &str = "rowwise.resolve_update_fields";

    if set_paths.is_empty() && null_paths.is_empty() {
        return Err(Error::invalid_parameter(
            OP,
            "both set paths and set-to-null paths are missing",
        ));
    }

    let set_paths = filter_paths::<R>(set_paths);
    let null_paths = filter_paths::<R>(null_paths);
    if set_paths.is_empty() && null_paths.is_empty() {
        return Err(Error::invalid_parameter(
            OP,
            "after filtering non-updatable fields, no fields remain",
        ));
    }

    for p in &set_paths {
        if null_paths.iter().any(|n| n.eq_ignore_ascii_case(p)) {
            return Err(Error::invalid_field_mask(
                OP,
                format!("{p} cannot be in both set paths and set-to-null paths"),
            ));
        }
    }

    let desc = R::descriptor();
    let row = resource.to_row();
    if row.len() != desc.column_count() {
        return Err(Error::invalid_parameter(
            OP,
            format!(
                "resource row has {} values, table {} has {} columns",
                row.len(),
                desc.table(),
                desc.column_count()
            ),
        ));
    }

    let mut fields: Vec<(String, Value)> = Vec::with_capacity(set_paths.len() + null_paths.len());
    for p in &null_paths {
        let Some(idx) = desc.find_column_index(p) else {
            return Err(Error::invalid_field_mask(
                OP,
                format!("field {p} was missing from the table {}", desc.table()),
            ));
        };
        fields.push((desc.columns()[idx].name.clone(), Value::Null));
    }
    for p in &set_paths {
        let Some(idx) = desc.find_column_index(p) else {
            return Err(Error::invalid_field_mask(
                OP,
                format!("field {p} was missing from the table {}", desc.table()),
            ));
        };
        fields.push((desc.columns()[idx].name.clone(), row[idx].clone()));
    }

    if fields.is_empty() {
        return Err(Error::invalid_parameter(
            OP,
            format!("no fields matched using paths {set_paths:?}"),
        ));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, ResourceDescriptor, Row};
    use lazy_static::lazy_static;

    lazy_static! {
        static ref DESC: ResourceDescriptor = ResourceDescriptor::new(
            "rentals",
            vec![
                Column::new("public_id", DataType::Text).primary_key(),
                Column::new("name", DataType::Text),
                Column::new("email", DataType::Text),
                Column::new("create_time", DataType::Timestamp).create_time(),
                Column::new("update_time", DataType::Timestamp).update_time(),
            ],
        );
    }

    struct Rental {
        name: String,
        email: Option<String>,
    }

    impl Resource for Rental {
        fn descriptor() -> &'static ResourceDescriptor {
            &DESC
        }
        fn to_row(&self) -> Row {
            vec![
                Value::Text("r_1".into()),
                Value::Text(self.name.clone()),
                self.email.clone().into(),
                Value::Null,
                Value::Null,
            ]
        }
        fn apply_row(&mut self, _row: &Row) -> Result<()> {
            Ok(())
        }
    }

    fn rental() -> Rental {
        Rental {
            name: "weekend".into(),
            email: Some("ops@example.com".into()),
        }
    }

    #[test]
    fn test_set_and_null_paths_resolve() {
        let fields = resolve_update_fields(&rental(), &["name"], &["email"]).unwrap();
        assert_eq!(
            fields,
            vec![
                ("email".to_string(), Value::Null),
                ("name".to_string(), Value::Text("weekend".into())),
            ]
        );
    }

    #[test]
    fn test_empty_masks_rejected() {
        let err = resolve_update_fields(&rental(), &[], &[]).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_non_updatable_fields_filtered() {
        // only non-updatable columns requested: nothing left after filtering
        let err = resolve_update_fields(&rental(), &["create_time"], &["update_time"]).unwrap_err();
        assert!(err.is_invalid_parameter());

        // mixed with a real column the timestamps are silently dropped
        let fields =
            resolve_update_fields(&rental(), &["name", "create_time"], &[]).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "name");
    }

    #[test]
    fn test_intersecting_masks_rejected() {
        let err = resolve_update_fields(&rental(), &["name"], &["Name"]).unwrap_err();
        assert!(err.is_invalid_field_mask());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = resolve_update_fields(&rental(), &["nickname"], &[]).unwrap_err();
        assert!(err.is_invalid_field_mask());
    }
}
