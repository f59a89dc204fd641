use crate::core::config::TileProviderConfig;
use crate::core::geo::TileRef;

/// Anything that can produce tile URLs for a given tile.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `tile`.
    fn url(&self, tile: TileRef) -> String;
}

/// Carto-style raster basemap: `{scheme}://{sub}.{host}/{style}/{z}/{x}/{y}.png`.
///
/// Requests are spread over the provider's subdomains by `row mod N`, so a
/// given tile always maps to the same host and stays browser/proxy cacheable.
#[derive(Debug, Clone)]
pub struct CartoTileSource {
    scheme: String,
    host: String,
    style: String,
    subdomains: Vec<String>,
}

impl CartoTileSource {
    pub fn new(config: &TileProviderConfig) -> Self {
        Self {
            scheme: config.scheme.clone(),
            host: config.host.clone(),
            style: config.style.trim_matches('/').to_string(),
            subdomains: config.subdomains.clone(),
        }
    }

    /// Carto's Voyager raster style
    pub fn voyager() -> Self {
        Self::new(&TileProviderConfig::default())
    }

    fn subdomain(&self, tile: &TileRef) -> Option<&str> {
        if self.subdomains.is_empty() {
            return None;
        }
        let idx = tile.row as usize % self.subdomains.len();
        Some(self.subdomains[idx].as_str())
    }
}

impl Default for CartoTileSource {
    fn default() -> Self {
        Self::voyager()
    }
}

impl TileSource for CartoTileSource {
    fn url(&self, tile: TileRef) -> String {
        match self.subdomain(&tile) {
            Some(sub) => format!(
                "{}://{}.{}/{}/{}/{}/{}.png",
                self.scheme, sub, self.host, self.style, tile.zoom_level, tile.col, tile.row
            ),
            None => format!(
                "{}://{}/{}/{}/{}/{}.png",
                self.scheme, self.host, self.style, tile.zoom_level, tile.col, tile.row
            ),
        }
    }
}
