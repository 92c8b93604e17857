use crate::config::{Config, DEFAULT_CONFIG_FILENAME, validate_config};
use crate::error::DocsignError;
use std::io::{self, BufRead};
use std::path::Path;

fn request_string(input: &mut impl BufRead, message: &str, default: &str) -> String {
    let mut line = String::new();
    println!("{}: (default: {})", message, default);

    match input.read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => default.to_string(),
    }
}

fn request_parsed<T: std::str::FromStr + ToString>(
    input: &mut impl BufRead,
    message: &str,
    default: T,
) -> Result<T, DocsignError> {
    let raw = request_string(input, message, &default.to_string());
    raw.parse::<T>().map_err(|_| {
        DocsignError::ConfigError(format!("'{}' is not a valid answer to '{}'", raw, message))
    })
}

/// Prompts for each setting on `input` and builds the config. Empty
/// answers take the default.
pub fn prompt_config(input: &mut impl BufRead) -> Result<Config, DocsignError> {
    let defaults = Config::with_defaults();
    let storage = request_string(input, "Enter the default storage (fs, memory)", "fs");
    let data_directory = request_string(
        input,
        "Directory for data storage",
        defaults.docsign_data_directory().as_deref().unwrap_or("./docsign_data"),
    );
    let base_url = request_string(
        input,
        "Base URL of signing links",
        defaults
            .docsign_signing_base_url()
            .as_deref()
            .unwrap_or("http://localhost:8080"),
    );
    let seed: bool = request_parsed(input, "Seed an empty store with demo documents", true)?;
    let upload_ms: u64 = request_parsed(input, "Simulated upload latency in ms", 1500)?;
    let view_ms: u64 = request_parsed(input, "Simulated view latency in ms", 1000)?;
    let signing_ms: u64 = request_parsed(input, "Simulated signing latency in ms", 1000)?;
    let failure_rate: f64 = request_parsed(input, "Simulated failure rate (0.0 - 1.0)", 0.0)?;

    let config = Config::builder()
        .default_storage(&storage)
        .data_directory(&data_directory)
        .signing_base_url(&base_url)
        .seed_demo_data(seed)
        .upload_latency_ms(upload_ms)
        .view_latency_ms(view_ms)
        .signing_latency_ms(signing_ms)
        .failure_rate(failure_rate)
        .build();
    config.validate()?;
    Ok(config)
}

/// Writes `config` to `path`, refusing to overwrite an existing file.
pub fn write_config(config: &Config, path: &Path) -> Result<(), DocsignError> {
    if path.exists() {
        return Err(DocsignError::ConfigError(format!(
            "Configuration file '{}' already exists. Please remove or rename it if you want to create a new one.",
            path.display()
        )));
    }
    let mut value = serde_json::to_value(config)?;
    if let Some(obj) = value.as_object_mut() {
        obj.retain(|_, v| !v.is_null());
    }
    let serialized = serde_json::to_string_pretty(&value)?;
    validate_config(&serialized)?;
    std::fs::write(path, serialized).map_err(|e| {
        DocsignError::ConfigError(format!(
            "Failed to write config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Ok(())
}

pub fn handle_config_create() -> Result<(), DocsignError> {
    println!("Welcome to the docsign Config Generator!");
    let path = Path::new(DEFAULT_CONFIG_FILENAME);
    if path.exists() {
        println!(
            "Configuration file '{}' already exists. Please remove or rename it if you want to create a new one.",
            DEFAULT_CONFIG_FILENAME
        );
        return Ok(());
    }
    let stdin = io::stdin();
    let config = prompt_config(&mut stdin.lock())?;
    write_config(&config, path)?;
    println!("{} file generated successfully!", DEFAULT_CONFIG_FILENAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_config_defaults() {
        let mut input = Cursor::new(Vec::<u8>::new());
        let config = prompt_config(&mut input).unwrap();
        assert_eq!(config.docsign_default_storage().as_deref(), Some("fs"));
        assert_eq!(*config.docsign_view_latency_ms(), Some(1000));
    }

    #[test]
    fn test_prompt_config_answers() {
        let mut input = Cursor::new(b"memory\n/tmp/ds\n\nfalse\n0\n0\n0\n0.25\n".to_vec());
        let config = prompt_config(&mut input).unwrap();
        assert_eq!(config.docsign_default_storage().as_deref(), Some("memory"));
        assert_eq!(config.docsign_data_directory().as_deref(), Some("/tmp/ds"));
        assert_eq!(*config.docsign_seed_demo_data(), Some(false));
        assert_eq!(*config.docsign_failure_rate(), Some(0.25));
    }

    #[test]
    fn test_prompt_config_rejects_bad_number() {
        let mut input = Cursor::new(b"\n\n\n\nsoon\n".to_vec());
        assert!(prompt_config(&mut input).is_err());
    }

    #[test]
    fn test_write_config_round_trips_through_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        let config = Config::builder().default_storage("memory").build();
        write_config(&config, &path).unwrap();

        let loaded = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.docsign_default_storage().as_deref(), Some("memory"));
        assert!(write_config(&config, &path).is_err());
    }
}
