//! Capturing the environment that gets rendered.

use std::collections::HashMap;

use crate::render::EnvironmentMap;

/// Take a snapshot of the process environment.
///
/// Names and values that are not valid Unicode are converted lossily rather than
/// dropped, so every variable the process can see shows up on the page.
pub fn capture() -> EnvironmentMap {
    std::env::vars_os()
        .map(|(k, v)| {
            let key = k.to_string_lossy().into_owned();
            if k.to_str().is_none() {
                tracing::warn!(%key, "Environment variable name is not valid Unicode");
            }
            let value = match v.into_string() {
                Ok(s) => s,
                Err(raw) => {
                    tracing::warn!(%key, "Environment value is not valid Unicode");
                    raw.to_string_lossy().into_owned()
                }
            };
            (key, value)
        })
        .collect()
}

/// Return a copy of `base` with `extras` applied on top. On a name collision the
/// value from `extras` wins.
pub fn overlay(base: &EnvironmentMap, extras: &HashMap<String, String>) -> EnvironmentMap {
    let mut merged = base.clone();
    merged.extend(extras.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn capture_sees_the_process_environment() {
        let path = std::env::var("PATH").unwrap_or_default();
        let env = capture();
        if !path.is_empty() {
            assert_eq!(Some(&path), env.get("PATH"));
        }
    }

    #[test]
    fn overlay_prefers_extras() {
        let base: EnvironmentMap = vec![
            ("A".to_owned(), "base".to_owned()),
            ("B".to_owned(), "base".to_owned()),
        ]
        .into_iter()
        .collect();
        let extras: HashMap<String, String> = vec![
            ("B".to_owned(), "extra".to_owned()),
            ("C".to_owned(), "extra".to_owned()),
        ]
        .into_iter()
        .collect();

        let merged = overlay(&base, &extras);
        assert_eq!("base", merged["A"]);
        assert_eq!("extra", merged["B"]);
        assert_eq!("extra", merged["C"]);
        // the base snapshot is untouched
        assert_eq!("base", base["B"]);
        assert!(!base.contains_key("C"));
    }
}
