//! Dataset loading.

pub mod geojson;

use tracing::info;

use crate::config::DataConfig;
use crate::error::Result;
use crate::models::Category;
use crate::spatial::FeatureCollection;

/// The three collections every query runs against
pub struct Datasets {
    pub sport: FeatureCollection,
    pub medical: FeatureCollection,
    pub stops: FeatureCollection,
}

/// Load sport facilities, medical facilities and stops
pub fn load_data(config: &DataConfig) -> Result<Datasets> {
    let sport = geojson::load_collection(&config.sport, Category::Sport, &config.id_property)?;
    let medical = geojson::load_collection(&config.medical, Category::Medical, &config.id_property)?;
    let stops = geojson::load_collection(&config.stops, Category::Stop, &config.id_property)?;

    info!(
        "Loaded {} sport facilities, {} medical facilities, {} stops",
        sport.len(),
        medical.len(),
        stops.len()
    );

    Ok(Datasets {
        sport,
        medical,
        stops,
    })
}
