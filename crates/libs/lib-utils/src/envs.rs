//! # Environment Variables
//!
//! Reading and parsing environment variables with defaults.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get an environment variable, falling back to `default` when unset.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, falling back to `default` when unset.
///
/// A value that is present but unparsable is an error, not a silent default.
pub fn get_env_parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| Error::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

/// Get a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn get_env_bool(name: &'static str, default: bool) -> Result<bool, Error> {
    match env::var(name) {
        Ok(val) => parse_bool(&val).ok_or(Error::WrongFormat(name)),
        Err(_) => Ok(default),
    }
}

/// Get a comma separated list, skipping blank entries.
pub fn get_env_list(name: &'static str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(val) => val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingEnv(name) => write!(fmt, "{name} must be set in environment"),
            Error::WrongFormat(name) => write!(fmt, "{name} has an invalid value"),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_missing_env_uses_default() {
        let value: u64 = get_env_parse_or("LIB_UTILS_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
        assert_eq!(get_env_or("LIB_UTILS_TEST_UNSET_VAR", "fallback"), "fallback");
        assert_eq!(get_env_list("LIB_UTILS_TEST_UNSET_VAR", &["a", "b"]), vec!["a", "b"]);
    }
}
