use serde::Serialize;

/// Base-map tile source offered in the layer switcher. Tiles themselves are
/// drawn by the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: Option<String>,
}

impl TileLayer {
    /// Wikimedia Maps with the given style key (e.g. `osm-intl`).
    pub fn wikimedia(style: &str) -> Self {
        Self {
            url_template: format!("https://maps.wikimedia.org/{style}/{{z}}/{{x}}/{{y}}.png"),
            max_zoom: 18,
            attribution: Some(
                "Wikimedia maps | Map data &copy; OpenStreetMap contributors".to_string(),
            ),
        }
    }

    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 19,
            attribution: Some(
                "&copy; <a href=\"https://openstreetmap.org/copyright\">OpenStreetMap contributors</a>"
                    .to_string(),
            ),
        }
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{s}", "a")
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}
