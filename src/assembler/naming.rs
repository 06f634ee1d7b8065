//! External field naming. Every key leaving the service goes through `to_camel_case`.

/// Convert a database column name to the camelCase form used on the wire.
///
/// PascalCase follows the usual acronym rule (`MenuURL` -> `menuURL`, `URLValue` -> `urlValue`,
/// `ID` -> `id`); snake_case is joined (`project_no` -> `projectNo`).
pub fn to_camel_case(name: &str) -> String {
    if name.contains('_') {
        return snake_to_camel(name);
    }

    let mut chars: Vec<char> = name.chars().collect();
    let len = chars.len();
    for i in 0..len {
        if !chars[i].is_uppercase() {
            break;
        }
        if i > 0 && i + 1 < len && !chars[i + 1].is_uppercase() {
            break;
        }
        chars[i] = chars[i].to_lowercase().next().unwrap_or(chars[i]);
    }
    chars.into_iter().collect()
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (idx, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        if idx == 0 {
            out.push_str(&to_camel_case(part));
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
