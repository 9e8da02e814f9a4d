use serde::{de::DeserializeOwned, Serialize};
use shapes::DetectorConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Loading and saving of configuration files, dispatched on the file extension.
pub trait ConfigFile: Serialize + DeserializeOwned {
    fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }
}

impl ConfigFile for DetectorConfig {}

/// The config at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<DetectorConfig, CliError> {
    match path {
        Some(path) => DetectorConfig::from_file(path),
        None => Ok(DetectorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("shapes-cli-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_partial_toml() {
        let config = DetectorConfig::from_toml("[extraction]\nmin_area = 50.0\n").unwrap();
        assert_eq!(config.extraction.min_area, 50.0);
        assert_eq!(config.simplify, DetectorConfig::default().simplify);
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = DetectorConfig::default();
        config.harris.nms_radius = 6;
        config.shi_tomasi.max_corners = 12;

        for name in ["config.toml", "config.json"] {
            let path = temp_path(name);
            config.to_file(&path).unwrap();
            assert_eq!(DetectorConfig::from_file(&path).unwrap(), config);
            fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DetectorConfig::from_file("config.yaml").unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFileFormat));
        assert!(matches!(
            DetectorConfig::default().to_file(temp_path("config")),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), DetectorConfig::default());
        assert!(matches!(
            load_config(Some(Path::new("/nonexistent/shapes.toml"))),
            Err(CliError::IoError(_))
        ));
    }
}
