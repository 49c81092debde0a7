//! Environment variable substitution and overrides for logging config.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::schema::LoggingConfig;

/// `${NAME}` or, with the leading `$` captured, the escaped `$${NAME}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$?)\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Overrides `fast_time` when set.
pub const FAST_TIME_VAR: &str = "LINELOG_FAST_TIME";
/// Overrides `flip_args` when set.
pub const FLIP_ARGS_VAR: &str = "LINELOG_FLIP_ARGS";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply `LINELOG_FAST_TIME` / `LINELOG_FLIP_ARGS` from the process environment.
pub fn apply_env_overrides(config: &mut LoggingConfig) {
    apply_env_overrides_with(config, &std::env::vars().collect());
}

/// Apply overrides from a provided map. Unparseable values are ignored.
pub fn apply_env_overrides_with(config: &mut LoggingConfig, env: &HashMap<String, String>) {
    if let Some(enabled) = env.get(FAST_TIME_VAR).and_then(|v| parse_flag(FAST_TIME_VAR, v)) {
        config.fast_time = Some(enabled);
    }
    if let Some(enabled) = env.get(FLIP_ARGS_VAR).and_then(|v| parse_flag(FLIP_ARGS_VAR, v)) {
        config.flip_args = Some(enabled);
    }
}

fn parse_flag(var: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(var, value = raw, "Ignoring unrecognized boolean override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"path": "${LOG_DIR}/app.log"});
        let env = env(&[("LOG_DIR", "/var/log/app")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["path"], "/var/log/app/app.log");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"streams": [{"path": "${MISSING_VAR}"}]});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_VAR"));
        assert!(err.contains("streams[0].path"));
    }

    #[test]
    fn error_on_empty_var() {
        let v = json!({"path": "${EMPTY}"});
        assert!(resolve_env_vars_with(&v, &env(&[("EMPTY", "")])).is_err());
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"path": "$${LOG_DIR}/x"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["path"], "${LOG_DIR}/x");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain-$tring", "n": 3});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }

    #[test]
    fn overrides_flags() {
        let mut config = LoggingConfig {
            fast_time: Some(false),
            ..Default::default()
        };
        apply_env_overrides_with(
            &mut config,
            &env(&[(FAST_TIME_VAR, "yes"), (FLIP_ARGS_VAR, "0")]),
        );
        assert_eq!(config.fast_time, Some(true));
        assert_eq!(config.flip_args, Some(false));
    }

    #[test]
    fn ignores_garbage_flags() {
        let mut config = LoggingConfig::default();
        apply_env_overrides_with(&mut config, &env(&[(FAST_TIME_VAR, "maybe")]));
        assert_eq!(config.fast_time, None);
    }
}
