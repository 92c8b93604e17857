use std::env;

#[derive(Debug)]
pub enum EnvError {
    Empty(String),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::Empty(key) => write!(f, "Environment variable '{}' is empty", key),
        }
    }
}

impl std::error::Error for EnvError {}

impl From<EnvError> for crate::error::DocsignError {
    fn from(err: EnvError) -> Self {
        crate::error::DocsignError::ConfigError(err.to_string())
    }
}

pub fn get_env_var(key: &str, required_non_empty: bool) -> Result<Option<String>, EnvError> {
    match env::var(key) {
        Ok(value) => {
            if required_non_empty && value.trim().is_empty() {
                Err(EnvError::Empty(key.to_string()))
            } else {
                Ok(Some(value))
            }
        }
        Err(_) => Ok(None),
    }
}

/// Reads a boolean flag; `true`/`1` (any case) are truthy.
pub fn get_env_bool(key: &str) -> Option<bool> {
    match get_env_var(key, false) {
        Ok(Some(val)) if !val.is_empty() => Some(val.to_lowercase() == "true" || val == "1"),
        _ => None,
    }
}

pub fn set_env_var(key: &str, value: &str) -> Result<(), EnvError> {
    // SAFETY: docsign only mutates the environment from single-threaded
    // setup code and from tests marked #[serial].
    unsafe {
        env::set_var(key, value);
    }
    Ok(())
}

pub fn clear_env_var(key: &str) -> Result<(), EnvError> {
    // SAFETY: see set_env_var.
    unsafe {
        env::remove_var(key);
    }
    Ok(())
}
