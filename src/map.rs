//! Interactive map rendering
//!
//! Produces a self-contained Leaflet HTML document with the WAQI real-time
//! tile overlay and a marker for the assessed reading.

use crate::models::AirQualityReading;
use crate::risk::RiskCategory;
use crate::{AirMapError, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const LEAFLET_VERSION: &str = "1.9.4";
const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const AQI_ATTRIBUTION: &str = "Air Quality Data &copy; WAQI";
const AQI_LAYER_NAME: &str = "Real-time AQI";

/// Marker color by AQI band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Green,
    Yellow,
    Red,
}

impl MarkerColor {
    /// CSS color name
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::Yellow => "yellow",
            MarkerColor::Red => "red",
        }
    }
}

/// Marker color for an AQI value
#[must_use]
pub fn aqi_color(aqi: i32) -> MarkerColor {
    if aqi <= 50 {
        MarkerColor::Green
    } else if aqi <= 100 {
        MarkerColor::Yellow
    } else {
        MarkerColor::Red
    }
}

/// Something that can turn an assessed reading into a map artifact
pub trait MapRenderer {
    /// Render the map and return the path of the written document
    fn render(&self, reading: &AirQualityReading, risk: RiskCategory) -> Result<PathBuf>;
}

/// WAQI tile URL template with the token filled in
#[must_use]
pub fn tile_url(tiles_base_url: &str, token: &str) -> String {
    format!(
        "{}/tiles/{{z}}/{{x}}/{{y}}.png?token={}",
        tiles_base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// JSON is valid JavaScript; "</" is split so a value can never close the script element.
fn to_script(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Complete map document for one reading
#[derive(Debug, Clone)]
pub struct MapDocument<'a> {
    pub reading: &'a AirQualityReading,
    pub risk: RiskCategory,
    pub tile_url: String,
    pub zoom: u8,
    pub marker_radius: u32,
}

impl MapDocument<'_> {
    /// Popup text shown when the marker is clicked
    #[must_use]
    pub fn popup_text(&self) -> String {
        let mut lines = vec![
            format!("AQI: {}", self.reading.aqi),
            format!("リスク: {}", self.risk),
        ];
        if let Some(station) = &self.reading.station_name {
            lines.push(format!("観測所: {station}"));
        }
        if let Some(pollutant) = &self.reading.dominant_pollutant {
            lines.push(format!("主要汚染物質: {pollutant}"));
        }
        if let Some(observed_at) = &self.reading.observed_at {
            lines.push(format!("観測時刻: {}", observed_at.format("%Y-%m-%d %H:%M %:z")));
        }
        lines.join("\n")
    }

    /// HTML of the text label placed on the marker
    #[must_use]
    pub fn label_html(&self) -> String {
        format!(
            r#"<div style="font-size: 12pt; color: {}; font-weight: bold;">AQI: {}<br>リスク: {}</div>"#,
            aqi_color(self.reading.aqi).as_css(),
            self.reading.aqi,
            escape_html(&self.risk.to_string())
        )
    }

    /// Render the full HTML document
    #[must_use]
    pub fn to_html(&self) -> String {
        let color = aqi_color(self.reading.aqi).as_css();
        let center = json!([self.reading.latitude, self.reading.longitude]);
        let circle_options = json!({
            "radius": self.marker_radius,
            "color": color,
            "fill": true,
            "fillColor": color,
            "fillOpacity": 0.7,
        });
        let popup = self
            .popup_text()
            .lines()
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br>");
        let label_icon = json!({
            "className": "aqi-label",
            "html": self.label_html(),
        });
        let title = format!("Air quality: {}", self.reading.location_name);

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; padding: 0; }} .aqi-label {{ white-space: nowrap; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView({center}, {zoom});
var base = L.tileLayer({osm_tiles}, {{ attribution: {osm_attribution} }}).addTo(map);
var aqi = L.tileLayer({aqi_tiles}, {{ attribution: {aqi_attribution} }}).addTo(map);
L.control.layers({{ "OpenStreetMap": base }}, {{ {aqi_name}: aqi }}).addTo(map);
L.circleMarker({center}, {circle_options}).bindPopup({popup}).addTo(map);
L.marker({center}, {{ icon: L.divIcon({label_icon}) }}).addTo(map);
</script>
</body>
</html>
"#,
            title = escape_html(&title),
            leaflet = LEAFLET_VERSION,
            center = to_script(&center),
            zoom = self.zoom,
            osm_tiles = to_script(&json!(OSM_TILES)),
            osm_attribution = to_script(&json!(OSM_ATTRIBUTION)),
            aqi_tiles = to_script(&json!(self.tile_url)),
            aqi_attribution = to_script(&json!(AQI_ATTRIBUTION)),
            aqi_name = to_script(&json!(AQI_LAYER_NAME)),
            circle_options = to_script(&circle_options),
            popup = to_script(&json!(popup)),
            label_icon = to_script(&label_icon),
        )
    }
}

/// Writes the map document to a fixed file path
#[derive(Debug, Clone)]
pub struct HtmlMapRenderer {
    pub output_path: PathBuf,
    pub tiles_base_url: String,
    pub token: String,
    pub zoom: u8,
    pub marker_radius: u32,
}

impl HtmlMapRenderer {
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>, tiles_base_url: &str, token: &str) -> Self {
        Self {
            output_path: output_path.into(),
            tiles_base_url: tiles_base_url.to_string(),
            token: token.to_string(),
            zoom: 10,
            marker_radius: 10,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_marker_radius(mut self, radius: u32) -> Self {
        self.marker_radius = radius;
        self
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn document<'a>(&self, reading: &'a AirQualityReading, risk: RiskCategory) -> MapDocument<'a> {
        MapDocument {
            reading,
            risk,
            tile_url: tile_url(&self.tiles_base_url, &self.token),
            zoom: self.zoom,
            marker_radius: self.marker_radius,
        }
    }
}

impl MapRenderer for HtmlMapRenderer {
    fn render(&self, reading: &AirQualityReading, risk: RiskCategory) -> Result<PathBuf> {
        let html = self.document(reading, risk).to_html();

        let path = &self.output_path;
        let write_failed =
            |e: std::io::Error| AirMapError::render(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_failed)?;
            }
        }
        fs::write(path, html.as_bytes()).map_err(write_failed)?;

        debug!("Wrote {} bytes", html.len());
        info!("Map written to {}", self.output_path.display());
        Ok(self.output_path.clone())
    }
}
