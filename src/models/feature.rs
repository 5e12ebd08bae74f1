//! Geolocated features and their coordinate reference systems.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};
use crate::spatial::projection::{self, MAX_EXTENT_M, MAX_LATITUDE};

/// Semantic collection a feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Sport facilities (query origins)
    Sport,
    /// Hospitals, clinics, emergency posts
    Medical,
    /// Public-transport stops
    Stop,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Sport => write!(f, "sport"),
            Category::Medical => write!(f, "medical"),
            Category::Stop => write!(f, "stop"),
        }
    }
}

/// Coordinate reference system of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic lon/lat degrees
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// Spherical Mercator meters, used for all distance math
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }

    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Crs::Wgs84),
            3857 | 900913 => Some(Crs::WebMercator),
            _ => None,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Coordinate pair tagged with its CRS.
///
/// For [`Crs::Wgs84`] `x` is longitude and `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    pub crs: Crs,
}

impl GeoPoint {
    pub fn wgs84(lon: f64, lat: f64) -> Self {
        Self {
            x: lon,
            y: lat,
            crs: Crs::Wgs84,
        }
    }

    pub fn web_mercator(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            crs: Crs::WebMercator,
        }
    }

    /// Reject coordinates that cannot be projected
    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(AccessError::InvalidInput(format!(
                "non-finite coordinate ({}, {})",
                self.x, self.y
            )));
        }

        match self.crs {
            Crs::Wgs84 => {
                if self.x.abs() > 180.0 {
                    return Err(AccessError::InvalidInput(format!(
                        "longitude {} outside [-180, 180]",
                        self.x
                    )));
                }
                if self.y.abs() > MAX_LATITUDE {
                    return Err(AccessError::InvalidInput(format!(
                        "latitude {} outside [-{MAX_LATITUDE}, {MAX_LATITUDE}]",
                        self.y
                    )));
                }
            }
            Crs::WebMercator => {
                if self.x.abs() > MAX_EXTENT_M || self.y.abs() > MAX_EXTENT_M {
                    return Err(AccessError::InvalidInput(format!(
                        "projected coordinate ({}, {}) outside the EPSG:3857 extent",
                        self.x, self.y
                    )));
                }
            }
        }

        Ok(())
    }

    /// Planar position in EPSG:3857 meters
    pub fn to_planar(&self) -> Point<f64> {
        match self.crs {
            Crs::Wgs84 => projection::project(self.x, self.y),
            Crs::WebMercator => Point::new(self.x, self.y),
        }
    }

    /// Same location expressed in EPSG:4326
    pub fn to_geographic(&self) -> GeoPoint {
        match self.crs {
            Crs::Wgs84 => *self,
            Crs::WebMercator => {
                let p = projection::unproject(self.x, self.y);
                GeoPoint::wgs84(p.x(), p.y())
            }
        }
    }

    /// Straight-line distance in projected meters
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        let a = self.to_planar();
        let b = other.to_planar();
        (a.x() - b.x()).hypot(a.y() - b.y())
    }
}

/// A single geolocated facility or stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    /// Identifier unique within its collection
    pub id: i64,

    pub category: Category,

    pub location: GeoPoint,

    /// Display name, if the source carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Feature {
    pub fn new(id: i64, category: Category, location: GeoPoint) -> Self {
        Self {
            id,
            category,
            location,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
