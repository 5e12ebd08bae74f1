use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use medreach::{AccessContext, Feature};

/// One row of the training table.
///
/// Distances to facilities that do not exist are left empty so the
/// training side imputes them with its own missing value.
#[derive(Debug, Serialize, PartialEq)]
pub struct SurveyRow {
    pub sport_id: i64,
    pub direct_med_dist: Option<f64>,
    pub via_stop_dist: Option<f64>,
    pub nearest_stop_dist: Option<f64>,
    pub label: &'static str,
}

/// Measure and label one sport facility
pub fn survey_row(ctx: &AccessContext, facility: &Feature) -> Result<SurveyRow> {
    let report = ctx.report(&facility.location)?;
    let label = ctx.classifier().classify(&report.distances);

    Ok(SurveyRow {
        sport_id: facility.id,
        direct_med_dist: report.medical_near.map(|n| n.distance),
        via_stop_dist: report.stop_medical_near.map(|n| n.distance),
        nearest_stop_dist: report.stop_near.map(|n| n.distance),
        label: label.as_str(),
    })
}

/// Write rows as CSV with a header line
pub fn write_rows<W: Write>(writer: W, rows: &[SurveyRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
