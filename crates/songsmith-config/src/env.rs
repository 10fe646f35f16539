use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` and `{{ env.VAR | default("x") }}` placeholders
///
/// Runs on the raw TOML text before deserialization so config structs hold
/// plain values. Comment lines are left untouched.
pub fn expand_env(input: &str) -> Result<String, String> {
    let expanded = input
        .split('\n')
        .map(expand_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expanded.join("\n"))
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

fn expand_line(line: &str) -> Result<String, String> {
    if line.trim_start().starts_with('#') {
        return Ok(line.to_string());
    }

    let mut failure = None;
    let replaced = placeholder().replace_all(line, |caps: &Captures<'_>| {
        let fallback = caps.get(2).map(|m| m.as_str());
        match resolve(&caps[1], fallback) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(replaced.into_owned()),
    }
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    std::env::var(var_name).or_else(|_| {
        fallback
            .map(str::to_string)
            .ok_or_else(|| format!("environment variable not found: `{var_name}`"))
    })
}
