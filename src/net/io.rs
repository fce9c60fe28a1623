//! JSON and RON persistence for nets and open nets.
use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file extension: {0:?}")]
    UnsupportedFormat(String),
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let pretty = PrettyConfig::default().new_line("\n".to_string());
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

/// Writes `value` as JSON or RON depending on the extension of `path`.
pub fn write<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = match extension(path)?.as_str() {
        "json" => to_json_string(value)?,
        _ => to_ron_string(value)?,
    };
    fs::write(path, content)?;
    Ok(())
}

/// Reads a JSON or RON file depending on the extension of `path`.
pub fn read<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let path = path.as_ref();
    let ext = extension(path)?;
    let content = fs::read_to_string(path)?;
    match ext.as_str() {
        "json" => from_json_str(&content),
        _ => from_ron_str(&content),
    }
}

fn extension(path: &Path) -> Result<String, IoError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" | "ron" => Ok(ext),
        _ => Err(IoError::UnsupportedFormat(ext)),
    }
}
