//! Environment lookups. A variable that is set but empty counts as unset everywhere
//! in the service, so `HTTP_PORT=` behaves exactly like no `HTTP_PORT` at all.

use std::collections::HashMap;

/// Value of `name`, or `default` when it is unset, empty, or not valid unicode.
pub fn resolve(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Drop empty values, leaving only the variables that should override defaults.
pub fn non_empty<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

/// Snapshot of the process environment with [`non_empty`] applied. Variables whose
/// name or value is not unicode are skipped.
pub fn non_empty_vars() -> HashMap<String, String> {
    non_empty(
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?))),
    )
}
