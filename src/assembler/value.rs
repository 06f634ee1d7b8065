//! Column lookup, link-key normalization and ordering over dynamic row values.

use std::cmp::Ordering;

use serde_json::Value;
use uuid::Uuid;

use super::Row;

/// Look a column up by its exact PascalCase name.
///
/// Typed rows decode through `#[sqlx(rename_all = "PascalCase")]`, which is exact too, so an
/// unquoted (lowercased) column fails the same way on both paths.
pub fn column<'a>(row: &'a Row, name: &str) -> Option<&'a Value> {
    row.get(name)
}

/// Normalize a link value to its comparison form.
///
/// GUIDs compare case-insensitively in hyphenated form, whole numbers compare the same whether
/// they arrive as `5`, `5.0` or `"5"`, and null never matches anything.
pub fn link_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_key(n)),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(id) = Uuid::parse_str(trimmed) {
                return Some(id.hyphenated().to_string());
            }
            if let Ok(n) = trimmed.parse::<i64>() {
                return Some(n.to_string());
            }
            Some(trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn number_key(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Ordering used by sort columns. Numbers before strings, nulls and missing values last.
pub fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx.partial_cmp(&fy).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (x.as_str(), y.as_str()) {
                (Some(sx), Some(sy)) => sx.cmp(sy),
                _ => x.to_string().cmp(&y.to_string()),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_lookup_is_exact() {
        let row = json!({ "ProjectNo": 7, "MainMenuId": null, "projectname": "Portal" });
        let row = row.as_object().unwrap();

        assert_eq!(column(row, "ProjectNo"), Some(&json!(7)));
        assert_eq!(column(row, "MainMenuId"), Some(&Value::Null));
        assert!(column(row, "project_no").is_none());
        assert!(column(row, "ProjectName").is_none());
    }

    #[test]
    fn guid_keys_ignore_case() {
        let upper = json!("6F9619FF-8B86-D011-B42D-00C04FC964FF");
        let lower = json!("6f9619ff-8b86-d011-b42d-00c04fc964ff");
        assert_eq!(link_key(&upper), link_key(&lower));
    }

    #[test]
    fn numeric_keys_match_across_representations() {
        assert_eq!(link_key(&json!(12)), Some("12".to_string()));
        assert_eq!(link_key(&json!(12.0)), Some("12".to_string()));
        assert_eq!(link_key(&json!("12")), Some("12".to_string()));
        assert_eq!(link_key(&Value::Null), None);
    }

    #[test]
    fn compare_puts_nulls_last() {
        assert_eq!(compare(Some(&json!(1)), Some(&json!(2))), Ordering::Less);
        assert_eq!(compare(Some(&Value::Null), Some(&json!(2))), Ordering::Greater);
        assert_eq!(compare(None, Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
    }
}
