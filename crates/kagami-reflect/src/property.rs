//! Property naming conventions
//!
//! Maps accessor method names (`getName`, `isActive`, `setName`) to logical
//! property names and validates candidate names.

/// Whether a method name has getter shape (`get<Name>` or `is<Name>`)
pub fn is_getter_name(name: &str) -> bool {
    (name.starts_with("get") && name.len() > 3) || (name.starts_with("is") && name.len() > 2)
}

/// Whether a method name has setter shape (`set<Name>`)
pub fn is_setter_name(name: &str) -> bool {
    name.starts_with("set") && name.len() > 3
}

/// Derive a property name from an accessor method name
///
/// Strips the `get`/`is`/`set` prefix and lower-cases the first letter of the
/// remainder. Exception, kept as documented policy: when the remainder's
/// first two characters are both upper-case the name is taken verbatim, so an
/// intentional acronym survives (`getURL` -> `URL`, but `getName` -> `name`
/// and `getX` -> `x`).
///
/// Returns `None` for names without an accessor prefix.
pub fn method_to_property(name: &str) -> Option<String> {
    let rest = strip_accessor_prefix(name)?;
    Some(decapitalize(rest))
}

/// Whether a derived property name is usable
///
/// Rejects names starting with the reserved `$` marker, the literal `class`,
/// and the serialization version marker.
pub fn is_valid_property(name: &str) -> bool {
    !(name.starts_with('$') || name == "serialVersionUID" || name == "class")
}

fn strip_accessor_prefix(name: &str) -> Option<&str> {
    for prefix in ["get", "set", "is"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return String::new(),
    };
    if matches!(name.chars().nth(1), Some(second) if second.is_uppercase()) {
        return name.to_string();
    }
    first.to_lowercase().chain(chars).collect()
}
