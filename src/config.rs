use crate::error::Result;
use crate::fields::FieldMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_DATA_PATH: &str = "obras.json";
pub const DEFAULT_OTHERS_LABEL: &str = "Otros";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub cache_ttl: Duration,
    pub top_n: usize,
    pub others_label: String,
    pub field_map_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from("."),
            cache_ttl: Duration::from_secs(300),
            top_n: 10,
            others_label: DEFAULT_OTHERS_LABEL.to_string(),
            field_map_path: None,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env_string(name)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env_string(name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

impl DashboardConfig {
    /// Settings from `OBRAS_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env_string("OBRAS_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            output_dir: env_string("OBRAS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            cache_ttl: Duration::from_secs(env_u64(
                "OBRAS_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            top_n: env_usize("OBRAS_TOP_N", defaults.top_n),
            others_label: env_string("OBRAS_OTHERS_LABEL").unwrap_or(defaults.others_label),
            field_map_path: env_string("OBRAS_FIELD_MAP").map(PathBuf::from),
        }
    }

    /// Default field map, with overrides from `field_map_path` when set.
    pub fn load_field_map(&self) -> Result<FieldMap> {
        match &self.field_map_path {
            Some(path) => {
                let map = FieldMap::from_json_str(&std::fs::read_to_string(path)?)?;
                info!(path = %path.display(), "loaded field map overrides");
                Ok(map)
            }
            None => Ok(FieldMap::default()),
        }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::fields::Field;

    #[test]
    fn defaults() {
        let c = DashboardConfig::default();
        assert_eq!(c.data_path, PathBuf::from("obras.json"));
        assert_eq!(c.top_n, 10);
        assert_eq!(c.others_label, "Otros");
        assert_eq!(c.output_path("summary.json"), PathBuf::from("./summary.json"));
    }

    #[test]
    fn field_map_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, r#"{"comuna": "COMUNA"}"#).unwrap();
        let c = DashboardConfig {
            field_map_path: Some(path),
            ..DashboardConfig::default()
        };
        assert_eq!(c.load_field_map().unwrap().column(Field::Comuna), "COMUNA");
    }

    #[test]
    fn missing_field_map_file_is_io_error() {
        let c = DashboardConfig {
            field_map_path: Some(PathBuf::from("/nonexistent/fields.json")),
            ..DashboardConfig::default()
        };
        assert!(matches!(c.load_field_map(), Err(DashboardError::Io(_))));
    }
}
