use crate::errors::{AppError, AppResult};
use crate::models::{Topic, TrackerSettings};
use crate::validation::decode_topic_set;
use std::path::PathBuf;

const BUNDLED_ASSETS: &[(&str, &str)] = &[("ifac_tcs", include_str!("../assets/ifac_tcs.json"))];

#[derive(Debug, Clone, PartialEq, Eq)]
enum AssetSource {
    Bundled,
    Directory(PathBuf),
}

/// Read-only built-in topic set, addressed by logical asset name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    name: String,
    source: AssetSource,
}

impl Catalog {
    pub fn bundled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: AssetSource::Bundled,
        }
    }

    /// Reads `<dir>/<name>.json` instead of the compiled-in asset.
    pub fn from_dir(dir: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: AssetSource::Directory(dir.into()),
        }
    }

    pub fn from_settings(settings: &TrackerSettings) -> Self {
        match &settings.catalog_dir {
            Some(dir) => Self::from_dir(dir.clone(), &settings.catalog_asset),
            None => Self::bundled(&settings.catalog_asset),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn load_built_in(&self) -> AppResult<Vec<Topic>> {
        let raw = match &self.source {
            AssetSource::Bundled => BUNDLED_ASSETS
                .iter()
                .find(|(name, _)| *name == self.name)
                .map(|(_, raw)| (*raw).to_string())
                .ok_or_else(|| AppError::AssetNotFound(self.name.clone()))?,
            AssetSource::Directory(dir) => {
                let path = dir.join(format!("{}.json", self.name));
                match tokio::fs::read_to_string(&path).await {
                    Ok(raw) => raw,
                    Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                        return Err(AppError::AssetNotFound(path.display().to_string()));
                    }
                    Err(error) => return Err(AppError::from(error)),
                }
            }
        };

        let topics = decode_topic_set(&raw)?;
        tracing::debug!(asset = %self.name, topics = topics.len(), "loaded built-in catalog");
        Ok(topics)
    }
}
