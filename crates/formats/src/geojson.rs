use foundation::LatLng;
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::feature::{Feature, Geometry, Properties, PropertyValue};

/// How raw `[x, y]` coordinate pairs map to geographic space.
pub type CoordinateTransform = fn(x: f64, y: f64) -> LatLng;

/// `[lon, lat]` pairs already in EPSG:4326.
pub fn geographic(lon: f64, lat: f64) -> LatLng {
    LatLng::new(lat, lon)
}

/// `[x, y]` pairs in EPSG:3857 meters.
pub fn spherical_mercator(x: f64, y: f64) -> LatLng {
    foundation::math::unproject(x, y)
}

/// Parses a GeoJSON FeatureCollection, converting every coordinate with
/// `transform`. Properties are copied as-is, see [`property_value`].
pub fn features_from_collection(
    value: &Value,
    transform: CoordinateTransform,
) -> Result<Vec<Feature>, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or(NormalizeError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(NormalizeError::NotAFeatureCollection)?;
    if ty != "FeatureCollection" {
        return Err(NormalizeError::NotAFeatureCollection);
    }

    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(NormalizeError::NotAFeatureCollection)?;

    let mut features = Vec::with_capacity(features_val.len());
    for (index, feat_val) in features_val.iter().enumerate() {
        let feat_obj = feat_val
            .as_object()
            .ok_or(NormalizeError::InvalidFeature {
                index,
                reason: "feature must be an object".to_string(),
            })?;

        let feat_type = feat_obj.get("type").and_then(|v| v.as_str()).ok_or(
            NormalizeError::InvalidFeature {
                index,
                reason: "feature missing type".to_string(),
            },
        )?;
        if feat_type != "Feature" {
            return Err(NormalizeError::InvalidFeature {
                index,
                reason: format!("unexpected feature type: {feat_type}"),
            });
        }

        let properties = feat_obj
            .get("properties")
            .and_then(|v| v.as_object())
            .map(convert_properties)
            .unwrap_or_default();

        // GeoJSON allows unlocated features.
        let geometry_val = match feat_obj.get("geometry") {
            None | Some(Value::Null) => continue,
            Some(v) => v,
        };
        let geometries = parse_geometry(geometry_val, transform)
            .map_err(|reason| NormalizeError::InvalidFeature { index, reason })?;

        for geometry in geometries {
            features.push(Feature {
                geometry,
                properties: properties.clone(),
            });
        }
    }

    Ok(features)
}

pub fn convert_properties(obj: &Map<String, Value>) -> Properties {
    obj.iter()
        .filter_map(|(k, v)| property_value(v).map(|pv| (k.clone(), pv)))
        .collect()
}

/// Strings and numbers are kept, nulls dropped, anything else is stored as
/// its JSON text.
pub fn property_value(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(PropertyValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        Value::Bool(b) => Some(PropertyValue::Text(b.to_string())),
        other => Some(PropertyValue::Text(other.to_string())),
    }
}

fn parse_geometry(value: &Value, transform: CoordinateTransform) -> Result<Vec<Geometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    if ty == "GeometryCollection" {
        let members = obj
            .get("geometries")
            .and_then(|v| v.as_array())
            .ok_or("GeometryCollection missing geometries".to_string())?;
        let mut out = Vec::new();
        for member in members {
            out.extend(parse_geometry(member, transform)?);
        }
        return Ok(out);
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(vec![Geometry::Point(parse_position(coords, transform)?)]),
        "MultiPoint" => Ok(parse_path(coords, transform)?
            .into_iter()
            .map(Geometry::Point)
            .collect()),
        "LineString" => Ok(vec![Geometry::Shape(vec![parse_path(coords, transform)?])]),
        "MultiLineString" | "Polygon" => {
            Ok(vec![Geometry::Shape(parse_rings(coords, transform)?)])
        }
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut rings = Vec::new();
            for poly in polys {
                rings.extend(parse_rings(poly, transform)?);
            }
            Ok(vec![Geometry::Shape(rings)])
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value, transform: CoordinateTransform) -> Result<LatLng, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    let x = arr[0].as_f64().ok_or("x must be a number".to_string())?;
    let y = arr[1].as_f64().ok_or("y must be a number".to_string())?;
    Ok(transform(x, y))
}

fn parse_path(coords: &Value, transform: CoordinateTransform) -> Result<Vec<LatLng>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item, transform)?);
    }
    Ok(out)
}

fn parse_rings(coords: &Value, transform: CoordinateTransform) -> Result<Vec<Vec<LatLng>>, String> {
    let rings = coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_path(ring, transform)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{features_from_collection, geographic, spherical_mercator};
    use crate::error::NormalizeError;
    use crate::feature::{Geometry, PropertyValue};
    use serde_json::json;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn unprojects_polygon_rings() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Somewhere", "osm_id": 42, "area": true, "tags": null},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1113194.9079327357, 0.0], [0.0, 6446275.841017158]]]
                }
            }]
        });
        let features = features_from_collection(&doc, spherical_mercator).expect("parse");
        assert_eq!(features.len(), 1);
        let Geometry::Shape(rings) = &features[0].geometry else {
            panic!("expected shape");
        };
        assert_eq!(rings.len(), 1);
        assert_close(rings[0][1].lng, 10.0, 1e-7);
        assert_close(rings[0][2].lat, 50.0, 1e-7);

        let props = &features[0].properties;
        assert_eq!(props.get("name"), Some(&PropertyValue::Text("Somewhere".into())));
        assert_eq!(props.get("osm_id"), Some(&PropertyValue::Number(42.0)));
        assert_eq!(props.get("area"), Some(&PropertyValue::Text("true".into())));
        assert!(!props.contains_key("tags"));
    }

    #[test]
    fn multi_point_splits_into_points() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"title": "Twin"},
                "geometry": {"type": "MultiPoint", "coordinates": [[11.0, 47.0], [11.5, 47.5]]}
            }, {
                "type": "Feature",
                "properties": {},
                "geometry": null
            }]
        });
        let features = features_from_collection(&doc, geographic).expect("parse");
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.title() == Some("Twin")));
        assert_eq!(features[1].geometry.as_point().map(|p| p.lat), Some(47.5));
    }

    #[test]
    fn rejects_non_collections_and_bad_geometry() {
        let err = features_from_collection(&json!({"type": "Feature"}), geographic).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAFeatureCollection));

        let doc = json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0]}}]
        });
        let err = features_from_collection(&doc, geographic).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidFeature { index: 0, .. }));
    }
}
