//! GeoJSON dataset reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use geo::Centroid;
use geojson::{feature::Id, GeoJson, Value};
use hashbrown::HashSet;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::{AccessError, Result};
use crate::models::{Category, Crs, Feature, GeoPoint};
use crate::spatial::FeatureCollection;

/// Read a (optionally gzipped) GeoJSON file into a collection
pub fn load_collection(path: &Path, category: Category, id_property: &str) -> Result<FeatureCollection> {
    info!("Loading {} features from {}", category, path.display());

    let file = File::open(path)?;
    let mut reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let features = parse_features(&content, category, id_property, &path.display().to_string())?;
    FeatureCollection::new(category, features)
}

/// Parse GeoJSON text into features normalized to EPSG:4326.
///
/// Features without a usable geometry are skipped, as are sport features
/// without an id. Medical and stop features without an id are kept under a
/// negative id derived from their position in the file.
pub fn parse_features(
    content: &str,
    category: Category,
    id_property: &str,
    source_name: &str,
) -> Result<Vec<Feature>> {
    let geojson: GeoJson = content
        .parse()
        .map_err(|e| AccessError::dataset(source_name, format!("Failed to parse GeoJSON: {}", e)))?;

    let (features, foreign_members) = match geojson {
        GeoJson::FeatureCollection(fc) => (fc.features, fc.foreign_members),
        GeoJson::Feature(feature) => (vec![feature], None),
        GeoJson::Geometry(_) => {
            return Err(AccessError::dataset(
                source_name,
                "expected a FeatureCollection, found a bare geometry",
            ))
        }
    };

    let crs = match foreign_members.as_ref().and_then(|fm| fm.get("crs")) {
        Some(crs) => parse_crs(crs, source_name)?,
        None => Crs::Wgs84,
    };
    debug!("{} declares {}", source_name, crs);

    let mut parsed = Vec::with_capacity(features.len());
    let mut unidentified = Vec::new();
    let mut skipped = 0usize;

    for (idx, feature) in features.iter().enumerate() {
        let Some((x, y)) = feature.geometry.as_ref().and_then(|g| representative_point(&g.value)) else {
            debug!("Feature #{} in {} has no usable geometry, skipping", idx, source_name);
            skipped += 1;
            continue;
        };

        let id = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(id_property))
            .and_then(json_to_id)
            .or_else(|| feature.id.as_ref().and_then(geojson_id_to_id));

        let id = match id {
            Some(id) => id,
            // Sport facilities are queried by id
            None if category == Category::Sport => {
                debug!("Feature #{} in {} has no '{}' id, skipping", idx, source_name, id_property);
                skipped += 1;
                continue;
            }
            None => {
                unidentified.push((parsed.len(), idx));
                0
            }
        };

        let location = match crs {
            Crs::Wgs84 => GeoPoint::wgs84(x, y),
            Crs::WebMercator => GeoPoint::web_mercator(x, y).to_geographic(),
        };

        let mut parsed_feature = Feature::new(id, category, location);
        if let Some(name) = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(|v| v.as_str())
        {
            parsed_feature = parsed_feature.with_name(name);
        }
        parsed.push(parsed_feature);
    }

    if !unidentified.is_empty() {
        assign_fallback_ids(&mut parsed, &unidentified);
        debug!(
            "Assigned position-based ids to {} features in {}",
            unidentified.len(),
            source_name
        );
    }

    if skipped > 0 {
        warn!(
            "Skipped {} of {} features in {} (missing id or geometry)",
            skipped,
            features.len(),
            source_name
        );
    }

    Ok(parsed)
}

/// Give id-less reference features the id `-(position + 1)`, moving further
/// down when that value is already taken by a real id.
fn assign_fallback_ids(features: &mut [Feature], unidentified: &[(usize, usize)]) {
    let slots: HashSet<usize> = unidentified.iter().map(|&(slot, _)| slot).collect();
    let mut taken: HashSet<i64> = features
        .iter()
        .enumerate()
        .filter(|(slot, _)| !slots.contains(slot))
        .map(|(_, f)| f.id)
        .collect();

    for &(slot, position) in unidentified {
        let mut id = -(position as i64) - 1;
        while taken.contains(&id) {
            id -= 1;
        }
        taken.insert(id);
        features[slot].id = id;
    }
}

/// Point geometries as-is, anything else by centroid
fn representative_point(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Point(coords) if coords.len() >= 2 => Some((coords[0], coords[1])),
        Value::Point(_) => None,
        other => {
            let geometry = geo::Geometry::<f64>::try_from(other.clone()).ok()?;
            geometry.centroid().map(|p| (p.x(), p.y()))
        }
    }
}

fn json_to_id(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn geojson_id_to_id(id: &Id) -> Option<i64> {
    match id {
        Id::Number(n) => json_to_id(&JsonValue::Number(n.clone())),
        Id::String(s) => s.trim().parse().ok(),
    }
}

/// Legacy GeoJSON `crs` member, e.g. `urn:ogc:def:crs:EPSG::3857`
fn parse_crs(crs: &JsonValue, source_name: &str) -> Result<Crs> {
    let name = crs
        .get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .unwrap_or_default();

    if name.ends_with("CRS84") {
        return Ok(Crs::Wgs84);
    }

    name.rsplit(':')
        .next()
        .and_then(|code| code.parse::<u32>().ok())
        .and_then(Crs::from_epsg)
        .ok_or_else(|| AccessError::UnsupportedCrs {
            crs: if name.is_empty() { crs.to_string() } else { name.to_string() },
            source_name: source_name.to_string(),
        })
}
