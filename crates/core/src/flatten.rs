use crate::domain::{CrmMember, FlatRow, ListContact, Table, Value};
use crate::utils::non_empty;

/// CRM property holding a member's LinkedIn profile link.
pub const LINKEDIN_PROPERTY: &str = "hs_linkedin_url";

/// Identity column of a flattened list member.
pub const VID_COLUMN: &str = "vid";

/// Flattens nested `{name: {value}}` property maps into one field per property.
/// Properties without a value are left out rather than defaulted.
pub fn flatten(contacts: &[ListContact]) -> Vec<FlatRow> {
    contacts.iter().map(flatten_contact).collect()
}

fn flatten_contact(contact: &ListContact) -> FlatRow {
    let fields = contact
        .properties
        .iter()
        .filter_map(|(name, property)| {
            let rendered = match property.value.as_ref()? {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((name.clone(), rendered))
        })
        .collect();

    FlatRow {
        vid: contact.vid,
        fields,
    }
}

impl FlatRow {
    /// Typed view used by the sync jobs; a blank profile link counts as missing.
    pub fn member(&self) -> CrmMember {
        CrmMember {
            vid: self.vid,
            linkedin_url: non_empty(self.fields.get(LINKEDIN_PROPERTY).map(String::as_str)),
        }
    }
}

/// Lays flat rows out as a table: `vid` first, then every property in
/// first-seen order. Members lacking a property get a null cell.
pub fn rows_to_table(rows: &[FlatRow]) -> Table {
    let mut columns = vec![VID_COLUMN.to_string()];
    for row in rows {
        for name in row.fields.keys() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for row in rows {
        let cells = table
            .columns
            .iter()
            .map(|column| {
                if column == VID_COLUMN {
                    Value::Integer(row.vid)
                } else {
                    row.fields.get(column).cloned().into()
                }
            })
            .collect();
        table.rows.push(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertyValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn contact(vid: i64, props: &[(&str, Option<serde_json::Value>)]) -> ListContact {
        ListContact {
            vid,
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), PropertyValue { value: v.clone() }))
                .collect(),
        }
    }

    #[test]
    fn test_flatten_single_record() {
        let rows = flatten(&[contact(
            123,
            &[("a", Some(json!("x"))), ("b", Some(json!("y")))],
        )]);

        let mut expected = BTreeMap::new();
        expected.insert("a".to_string(), "x".to_string());
        expected.insert("b".to_string(), "y".to_string());
        assert_eq!(
            rows,
            vec![FlatRow {
                vid: 123,
                fields: expected
            }]
        );
    }

    #[test]
    fn test_flatten_omits_missing_values() {
        let rows = flatten(&[contact(
            1,
            &[("email", None), ("phone", Some(serde_json::Value::Null)), ("firstname", Some(json!("Ada")))],
        )]);

        assert_eq!(rows[0].fields.len(), 1);
        assert_eq!(rows[0].fields["firstname"], "Ada");
    }

    #[test]
    fn test_flatten_renders_non_string_values() {
        let rows = flatten(&[contact(1, &[("score", Some(json!(42)))])]);
        assert_eq!(rows[0].fields["score"], "42");
    }

    #[test]
    fn test_flatten_preserves_order() {
        let rows = flatten(&[contact(3, &[]), contact(1, &[]), contact(2, &[])]);
        let vids: Vec<i64> = rows.iter().map(|r| r.vid).collect();
        assert_eq!(vids, vec![3, 1, 2]);
    }

    #[test]
    fn test_member_trims_linkedin_url() {
        let rows = flatten(&[
            contact(1, &[(LINKEDIN_PROPERTY, Some(json!(" https://linkedin.com/in/a ")))]),
            contact(2, &[(LINKEDIN_PROPERTY, Some(json!("   ")))]),
            contact(3, &[]),
        ]);

        assert_eq!(
            rows[0].member().linkedin_url.as_deref(),
            Some("https://linkedin.com/in/a")
        );
        assert_eq!(rows[1].member().linkedin_url, None);
        assert_eq!(rows[2].member().linkedin_url, None);
    }

    #[test]
    fn test_rows_to_table_unions_columns() {
        let rows = flatten(&[
            contact(1, &[("b", Some(json!("1b")))]),
            contact(2, &[("a", Some(json!("2a"))), ("b", Some(json!("2b")))]),
        ]);

        let table = rows_to_table(&rows);

        assert_eq!(table.columns, vec!["vid", "b", "a"]);
        assert_eq!(
            table.rows[0],
            vec![Value::Integer(1), Value::Text("1b".to_string()), Value::Null]
        );
        assert_eq!(
            table.rows[1],
            vec![
                Value::Integer(2),
                Value::Text("2b".to_string()),
                Value::Text("2a".to_string())
            ]
        );
    }

    #[test]
    fn test_rows_to_table_empty() {
        let table = rows_to_table(&[]);
        assert_eq!(table.columns, vec!["vid"]);
        assert!(table.is_empty());
    }
}
