//! Environment variable interpolation for settings files

use super::error::ConfigError;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern"))
}

/// Replace every `${VAR}` reference in a settings document with the value of
/// the environment variable `VAR`. The first missing variable is reported.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = cap.get(0).expect("match group").as_str();
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(ConfigError::EnvVarNotFound {
                    var: var_name.to_string(),
                });
            }
        }
    }

    Ok(result)
}
