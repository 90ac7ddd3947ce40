//! Typed GeoJSON for the two feeds the map consumes.
//!
//! Only the members that are read downstream are modelled. Unknown members
//! are ignored so the live feeds can grow fields without breaking parsing.

use crate::core::geo::LatLng;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// `properties` of a USGS earthquake feature
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuakeProperties {
    #[serde(default)]
    pub place: Option<String>,
    /// Event time, milliseconds since the Unix epoch
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub mag: Option<f64>,
}

/// Point geometry of an earthquake: longitude, latitude, depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuakeGeometry {
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuakeFeature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: QuakeProperties,
    pub geometry: QuakeGeometry,
}

impl QuakeFeature {
    /// Magnitude used for classification. The feed reports `null` for some
    /// events; those classify as zero.
    pub fn magnitude(&self) -> f64 {
        self.properties.mag.unwrap_or(0.0)
    }

    pub fn place(&self) -> &str {
        self.properties.place.as_deref().unwrap_or_default()
    }

    pub fn time_millis(&self) -> i64 {
        self.properties.time.unwrap_or(0)
    }

    /// Epicenter. Collections are validated on parse, so this only returns
    /// `None` for features built by hand.
    pub fn position(&self) -> Option<LatLng> {
        LatLng::from_position(&self.geometry.coordinates)
    }

    pub fn depth(&self) -> Option<f64> {
        self.geometry.coordinates.get(2).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuakeCollection {
    #[serde(default)]
    pub features: Vec<QuakeFeature>,
}

impl QuakeCollection {
    pub fn new(features: Vec<QuakeFeature>) -> Self {
        Self { features }
    }

    pub fn from_str(json: &str) -> Result<Self> {
        let collection: Self = serde_json::from_str(json)?;
        collection.validate()?;
        Ok(collection)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let collection: Self = serde_json::from_value(value)?;
        collection.validate()?;
        Ok(collection)
    }

    /// Rejects the whole collection if any feature lacks a usable position.
    pub fn validate(&self) -> Result<()> {
        for (index, feature) in self.features.iter().enumerate() {
            if feature.position().is_none() {
                return Err(MapError::ParseError(format!(
                    "feature {} has {} coordinate(s), expected at least 2",
                    index,
                    feature.geometry.coordinates.len()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Geometries found in the plate boundary dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl BoundaryGeometry {
    /// Polylines of the geometry; polygon rings are drawn as closed lines.
    pub fn lines(&self) -> Vec<Vec<LatLng>> {
        fn line(coords: &[Vec<f64>]) -> Vec<LatLng> {
            coords
                .iter()
                .filter_map(|c| LatLng::from_position(c))
                .collect()
        }

        match self {
            BoundaryGeometry::LineString { coordinates } => vec![line(coordinates)],
            BoundaryGeometry::MultiLineString { coordinates }
            | BoundaryGeometry::Polygon { coordinates } => {
                coordinates.iter().map(|c| line(c)).collect()
            }
            BoundaryGeometry::Unsupported => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(default)]
    pub geometry: Option<BoundaryGeometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryCollection {
    #[serde(default)]
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    pub fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// All drawable polylines, skipping degenerate ones
    pub fn lines(&self) -> Vec<Vec<LatLng>> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(|g| g.lines())
            .filter(|l| l.len() >= 2)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_usgs_feature() {
        let value = json!({
            "type": "FeatureCollection",
            "metadata": {"count": 1},
            "features": [{
                "type": "Feature",
                "id": "us7000abcd",
                "properties": {"mag": 4.6, "place": "10 km S of Somewhere", "time": 1678785664000i64, "tsunami": 0},
                "geometry": {"type": "Point", "coordinates": [-100.0, 40.0, 12.5]}
            }]
        });
        let collection = QuakeCollection::from_value(value).unwrap();
        assert_eq!(collection.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.magnitude(), 4.6);
        assert_eq!(feature.place(), "10 km S of Somewhere");
        assert_eq!(feature.position(), Some(LatLng::new(40.0, -100.0)));
        assert_eq!(feature.depth(), Some(12.5));
    }

    #[test]
    fn test_null_magnitude_and_place() {
        let value = json!({
            "features": [{
                "properties": {"mag": null, "place": null, "time": 0},
                "geometry": {"coordinates": [1.0, 2.0]}
            }]
        });
        let collection = QuakeCollection::from_value(value).unwrap();
        assert_eq!(collection.features[0].magnitude(), 0.0);
        assert_eq!(collection.features[0].place(), "");
    }

    #[test]
    fn test_missing_geometry_is_rejected() {
        let value = json!({"features": [{"properties": {"mag": 1.0}}]});
        assert!(matches!(
            QuakeCollection::from_value(value),
            Err(MapError::Serialization(_))
        ));
    }

    #[test]
    fn test_short_coordinates_are_rejected() {
        let value = json!({"features": [{"geometry": {"coordinates": [1.0]}}]});
        assert!(matches!(
            QuakeCollection::from_value(value),
            Err(MapError::ParseError(_))
        ));
    }

    #[test]
    fn test_boundary_lines() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"Name": "AF-AN"},
                 "geometry": {"type": "LineString", "coordinates": [[-0.4, -54.8], [0.0, -54.7], [1.2, -54.5]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "MultiLineString", "coordinates": [[[10.0, 1.0], [11.0, 2.0]], [[5.0, 5.0]]]}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}},
                {"type": "Feature", "geometry": null}
            ]
        });
        let collection = BoundaryCollection::from_value(value).unwrap();
        let lines = collection.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0], LatLng::new(-54.8, -0.4));
        assert_eq!(lines[1].len(), 2);
    }
}
