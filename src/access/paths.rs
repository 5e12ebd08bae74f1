//! Path segments rendered for a classified point.

use super::distances::DistanceReport;
use crate::models::{AccessibilityLabel, GeoPoint, NearestResult, PathSegment, SegmentKind};

/// Segments shown for `label`.
///
/// Green draws the direct line to the nearest medical facility. Yellow and
/// red draw point→stop and stop→medical, each only when both ends exist.
/// Endpoints are returned in EPSG:4326.
pub fn build_path_segments(
    origin: &GeoPoint,
    label: AccessibilityLabel,
    report: &DistanceReport<'_>,
) -> Vec<PathSegment> {
    let segment = |from: &GeoPoint, to: &NearestResult<'_>, kind| PathSegment {
        from: from.to_geographic(),
        to: to.feature.location.to_geographic(),
        kind,
        distance_m: to.distance,
    };

    let mut segments = Vec::with_capacity(2);
    match label {
        AccessibilityLabel::Green => {
            if let Some(medical) = &report.medical_near {
                segments.push(segment(origin, medical, SegmentKind::Direct));
            }
        }
        AccessibilityLabel::Yellow | AccessibilityLabel::Red => {
            if let Some(stop) = &report.stop_near {
                segments.push(segment(origin, stop, SegmentKind::ToStop));

                if let Some(medical) = &report.stop_medical_near {
                    segments.push(segment(&stop.feature.location, medical, SegmentKind::StopToMedical));
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::distances::compute_distances;
    use crate::models::{Category, Feature};
    use crate::spatial::FeatureCollection;

    fn fixtures() -> (FeatureCollection, FeatureCollection) {
        let medical = FeatureCollection::new(
            Category::Medical,
            vec![Feature::new(1, Category::Medical, GeoPoint::web_mercator(0.0, 800.0))],
        )
        .unwrap();
        let stops = FeatureCollection::new(
            Category::Stop,
            vec![Feature::new(2, Category::Stop, GeoPoint::web_mercator(0.0, 200.0))],
        )
        .unwrap();
        (medical, stops)
    }

    #[test]
    fn test_green_single_direct_segment() {
        let (medical, stops) = fixtures();
        let origin = GeoPoint::web_mercator(0.0, 0.0);
        let report = compute_distances(&origin, &medical, &stops, 9999.0);

        let segments = build_path_segments(&origin, AccessibilityLabel::Green, &report);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Direct);
        assert!((segments[0].distance_m - 800.0).abs() < 1e-9);
        assert_eq!(segments[0].to, GeoPoint::web_mercator(0.0, 800.0).to_geographic());
    }

    #[test]
    fn test_transit_segments_chain_through_stop() {
        let (medical, stops) = fixtures();
        let origin = GeoPoint::web_mercator(0.0, 0.0);
        let report = compute_distances(&origin, &medical, &stops, 9999.0);

        for label in [AccessibilityLabel::Yellow, AccessibilityLabel::Red] {
            let segments = build_path_segments(&origin, label, &report);
            assert_eq!(segments.len(), 2);
            assert_eq!(segments[0].kind, SegmentKind::ToStop);
            assert_eq!(segments[1].kind, SegmentKind::StopToMedical);
            assert_eq!(segments[0].to, segments[1].from);
            assert!((segments[1].distance_m - 600.0).abs() < 1e-9);
            assert_eq!(segments[0].from.crs, crate::models::Crs::Wgs84);
        }
    }

    #[test]
    fn test_missing_endpoints_drop_segments() {
        let medical = FeatureCollection::empty(Category::Medical);
        let stops = FeatureCollection::empty(Category::Stop);
        let origin = GeoPoint::wgs84(37.6, 55.7);
        let report = compute_distances(&origin, &medical, &stops, 9999.0);

        assert!(build_path_segments(&origin, AccessibilityLabel::Green, &report).is_empty());
        assert!(build_path_segments(&origin, AccessibilityLabel::Red, &report).is_empty());
    }
}
