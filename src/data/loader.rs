use std::path::PathBuf;

use crate::data::quakes::VectorFeatureSet;
use crate::{MapError, Result};

/// Where the feature collection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` locations are URLs, anything else a path
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Fetches and parses the collection. Every failure is reported as
    /// [`MapError::DataLoad`] naming the source.
    pub async fn load(&self, magnitude_property: &str) -> Result<VectorFeatureSet> {
        let text = self.read().await.map_err(|e| match e {
            MapError::DataLoad(_) => e,
            other => MapError::DataLoad(format!("{}: {}", self, other)),
        })?;
        VectorFeatureSet::from_str(&text, magnitude_property)
            .map_err(|e| MapError::DataLoad(format!("{}: {}", self, e)))
    }

    async fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => Ok(std::fs::read_to_string(path)?),
            Self::Url(url) => {
                let resp = crate::tiles::loader::HTTP_CLIENT.get(url).send().await?;
                if !resp.status().is_success() {
                    return Err(MapError::DataLoad(format!(
                        "{}: HTTP {}",
                        url,
                        resp.status()
                    )));
                }
                Ok(resp.text().await?)
            }
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
