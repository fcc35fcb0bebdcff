//! Fetch, assess and render for a single location

use crate::map::MapRenderer;
use crate::models::{AirQualityReading, UserProfile};
use crate::risk::{RiskBreakdown, RiskCategory};
use crate::waqi::AirQualitySource;
use crate::{AirMapError, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Location and profile to assess
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub location: String,
    pub profile: UserProfile,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub reading: AirQualityReading,
    pub risk: RiskCategory,
    pub map_path: PathBuf,
}

/// Run the pipeline once, writing console lines to `out`
pub fn run<S, R, W>(
    source: &S,
    renderer: &R,
    request: &AssessmentRequest,
    out: &mut W,
) -> Result<RunReport>
where
    S: AirQualitySource + ?Sized,
    R: MapRenderer + ?Sized,
    W: Write,
{
    info!("Assessing air quality risk for '{}'", request.location);

    let Some(reading) = source.fetch(&request.location) else {
        writeln!(out, "Failed to retrieve air quality data.")?;
        return Err(AirMapError::fetch_failure(&request.location));
    };

    info!(
        "Reading for '{}' at {}: AQI {}, station {}, dominant pollutant {}, observed {}",
        reading.location_name,
        reading.format_coordinates(),
        reading.aqi,
        reading.station_name.as_deref().unwrap_or("unknown"),
        reading.dominant_pollutant.as_deref().unwrap_or("unknown"),
        reading
            .observed_at
            .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339())
    );

    let breakdown = RiskBreakdown::compute(reading.aqi, &request.profile);
    debug!(
        "Risk score: base={} vulnerability={} nationality={} raw={} -> {:?}",
        breakdown.base,
        breakdown.vulnerability,
        breakdown.nationality,
        breakdown.raw_score,
        breakdown.category
    );
    let risk = breakdown.category;

    writeln!(out, "{} AQI: {}", request.location, reading.aqi)?;
    writeln!(out, "リスク評価: {risk}")?;

    let map_path = renderer.render(&reading, risk)?;
    writeln!(out, "Map generated: {}", map_path.display())?;

    Ok(RunReport {
        reading,
        risk,
        map_path,
    })
}
