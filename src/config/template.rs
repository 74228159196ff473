// src/config/template.rs

//! `{key}` placeholder expansion for the `[batch]` section.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{BatchError, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
});

/// Expand every `{key}` in `template` from `vars`.
///
/// Unknown keys are an error rather than being left in place, so a typo in
/// the config never turns into a literal `{bach}` directory on disk.
pub fn render(template: &str, vars: &BTreeMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let key = &caps[1];
        let value = vars.get(key).ok_or_else(|| {
            BatchError::TemplateError(format!(
                "unknown placeholder '{{{key}}}' in '{template}'"
            ))
        })?;

        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("batch", "07".to_string()),
            ("date", "20240115".to_string()),
        ])
    }

    #[test]
    fn expands_known_placeholders() {
        let out = render("batch{batch}_{date}", &vars()).unwrap();
        assert_eq!(out, "batch07_20240115");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        assert_eq!(render("/data/plain", &vars()).unwrap(), "/data/plain");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        match render("{bach}", &vars()) {
            Err(BatchError::TemplateError(msg)) => assert!(msg.contains("bach")),
            other => panic!("expected TemplateError, got {other:?}"),
        }
    }
}
