use crate::core::{config::MapConfig, geo::TileCoord};

/// Anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// One Mapbox style served through a URL template with `{style}`, `{z}`,
/// `{x}`, `{y}` and `{token}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct MapboxStyleSource {
    template: String,
    style: String,
    access_token: String,
}

impl MapboxStyleSource {
    pub fn new(
        template: impl Into<String>,
        style: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            template: template.into(),
            style: style.into(),
            access_token: access_token.into(),
        }
    }

    /// Source for `style` using the template and token of `config`
    pub fn from_config(config: &MapConfig, style: &str) -> Self {
        Self::new(&config.tile_url_template, style, &config.access_token)
    }

    pub fn style(&self) -> &str {
        &self.style
    }
}

impl TileSource for MapboxStyleSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{style}", &self.style)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{token}", &self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapbox_url() {
        let source = MapboxStyleSource::from_config(
            &MapConfig::default().with_access_token("pk.abc"),
            "mapbox/dark-v9",
        );
        assert_eq!(
            source.url(TileCoord::new(7, 12, 5)),
            "https://api.mapbox.com/styles/v1/mapbox/dark-v9/tiles/256/5/7/12?access_token=pk.abc"
        );
    }

    #[test]
    fn test_custom_template() {
        let source = MapboxStyleSource::new("http://localhost/{style}/{z}/{x}/{y}.png", "s", "");
        assert_eq!(source.url(TileCoord::new(1, 2, 3)), "http://localhost/s/3/1/2.png");
    }
}
