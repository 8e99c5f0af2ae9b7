use std::path::PathBuf;

use serde_json::Value;

/// Parse and validate a global variable name for script builds.
///
/// Dotted names assign into a namespace (`Acme.Widgets`); every segment must
/// be a valid JavaScript identifier:
/// - Must start with a letter, underscore, or dollar sign
/// - Can contain letters, numbers, underscores, or dollar signs
/// - Cannot be empty
///
/// # Examples
///
/// Valid: MyLibrary, _internal, $jquery, lib123, Acme.Widgets
/// Invalid: 123abc, my-lib, Acme..Widgets, ""
pub fn parse_global(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Global name cannot be empty".to_string());
    }

    for segment in s.split('.') {
        let Some(first) = segment.chars().next() else {
            return Err(format!("Global name has an empty segment: '{s}'"));
        };
        if !first.is_alphabetic() && first != '_' && first != '$' {
            return Err(format!(
                "Global name must start with a letter, underscore, or dollar sign: '{s}'"
            ));
        }
        if segment
            .chars()
            .any(|c| !c.is_alphanumeric() && c != '_' && c != '$')
        {
            return Err(format!(
                "Global name can only contain letters, numbers, underscores, or dollar signs: '{s}'"
            ));
        }
    }

    Ok(s.to_string())
}

/// Parse `SPECIFIER=Global`, e.g. `framework-x=FrameworkX`.
pub fn parse_global_mapping(s: &str) -> Result<(String, String), String> {
    let (specifier, global) = split_pair(s, "SPECIFIER=Global")?;
    Ok((specifier.to_string(), parse_global(global)?))
}

/// Parse `PREFIX=DIR`, e.g. `@=src`.
pub fn parse_alias(s: &str) -> Result<(String, PathBuf), String> {
    let (prefix, dir) = split_pair(s, "PREFIX=DIR")?;
    Ok((prefix.to_string(), PathBuf::from(dir)))
}

/// Parse `TOKEN=VALUE`. The value is read as JSON; anything that is not
/// valid JSON is taken as a string, so `-D __MODE__=lite` works unquoted.
pub fn parse_define(s: &str) -> Result<(String, Value), String> {
    let (token, raw) = split_pair(s, "TOKEN=VALUE")?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((token.to_string(), value))
}

fn split_pair<'a>(s: &'a str, shape: &str) -> Result<(&'a str, &'a str), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => Err(format!("expected {shape}, got '{s}'")),
    }
}
