//! File and stdin helpers shared by commands.

use crate::error::CliError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::Path;

/// Key directory file layout: actor id -> hex key.
pub type KeyDirectory = BTreeMap<String, String>;

/// Reads a file, or stdin when no path is given.
pub fn read_source(input: Option<&str>) -> Result<String, CliError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

/// Reads and parses a JSON document.
pub fn read_json<T: DeserializeOwned>(input: Option<&str>) -> Result<T, CliError> {
    let text = read_source(input)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: input.unwrap_or("<stdin>").to_string(),
        source,
    })
}

/// Reads a key directory, treating a missing file as empty.
pub fn read_directory_or_default(path: &str) -> Result<KeyDirectory, CliError> {
    if !Path::new(path).exists() {
        return Ok(KeyDirectory::new());
    }
    read_json(Some(path))
}

/// Writes pretty-printed JSON, replacing the file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| CliError::Json {
        path: path.to_string(),
        source,
    })?;
    std::fs::write(path, text + "\n").map_err(|source| CliError::Write {
        path: path.to_string(),
        source,
    })
}
