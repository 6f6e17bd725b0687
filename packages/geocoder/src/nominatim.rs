//! Nominatim / OpenStreetMap boundary resolver.
//!
//! Issues a free-form search with `polygon_geojson=1` and takes the
//! first result whose geometry is a `Polygon` or `MultiPolygon`. Places
//! that Nominatim only knows as a point (a single address, a node) are
//! reported as [`GeocodeError::NotFound`]: a point cannot be drawn as a
//! danger zone.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::{Duration, Instant};

use async_trait::async_trait;
use polaris_zones_models::{FeatureGeometry, GeometricFeature, LocationRecord};
use tokio::sync::Mutex;

use crate::service::NominatimService;
use crate::{GeoResolver, GeocodeError};

/// Number of candidates requested per search. Several are fetched so a
/// polygon further down the list can win over a leading point result.
const CANDIDATE_LIMIT: &str = "5";

/// Resolves place names to boundaries using a Nominatim instance.
///
/// Requests are serialized and spaced at least `rate_limit_ms` apart.
pub struct NominatimResolver {
    client: reqwest::Client,
    service: NominatimService,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimResolver {
    /// Creates a resolver for the given service definition.
    #[must_use]
    pub fn new(client: reqwest::Client, service: NominatimService) -> Self {
        Self {
            client,
            service,
            last_request: Mutex::new(None),
        }
    }

    async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError> {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let spacing = Duration::from_millis(self.service.rate_limit_ms);
            let elapsed = previous.elapsed();
            if elapsed < spacing {
                tokio::time::sleep(spacing - elapsed).await;
            }
        }
        *last = Some(Instant::now());

        let mut params = vec![
            ("q", query),
            ("format", "jsonv2"),
            ("polygon_geojson", "1"),
            ("limit", CANDIDATE_LIMIT),
        ];
        if let Some(codes) = self.service.country_codes.as_deref() {
            params.push(("countrycodes", codes));
        }

        let resp = self
            .client
            .get(&self.service.base_url)
            .header(reqwest::header::USER_AGENT, &self.service.user_agent)
            .query(&params)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Parse {
                message: format!("Nominatim request failed with status {}", resp.status()),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl GeoResolver for NominatimResolver {
    async fn resolve(&self, record: &LocationRecord) -> Result<GeometricFeature, GeocodeError> {
        log::debug!("Resolving boundary for '{}'", record.name());
        let body = self.search(record.name()).await?;
        parse_response(&body, record)
    }
}

/// Parses a Nominatim `jsonv2` response into a feature for `record`.
fn parse_response(
    body: &serde_json::Value,
    record: &LocationRecord,
) -> Result<GeometricFeature, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    for result in results {
        let Some(geojson) = result.get("geojson") else {
            continue;
        };

        if let Some(geometry) = to_feature_geometry(geojson)? {
            return Ok(GeometricFeature::new(record.clone(), geometry));
        }
    }

    Err(GeocodeError::NotFound {
        query: record.name().to_string(),
    })
}

/// Converts a `GeoJSON` geometry object into an area geometry.
///
/// Returns `Ok(None)` for valid non-area geometries (points, lines).
fn to_feature_geometry(
    value: &serde_json::Value,
) -> Result<Option<FeatureGeometry>, GeocodeError> {
    let geometry: geojson::Geometry =
        serde_json::from_value(value.clone()).map_err(|e| GeocodeError::Parse {
            message: format!("Invalid GeoJSON geometry in Nominatim response: {e}"),
        })?;

    let geometry: geo::Geometry<f64> =
        geometry.try_into().map_err(|e: geojson::Error| GeocodeError::Parse {
            message: format!("Unsupported GeoJSON geometry: {e}"),
        })?;

    Ok(match geometry {
        geo::Geometry::Polygon(p) => Some(FeatureGeometry::Polygon(p)),
        geo::Geometry::MultiPolygon(mp) => Some(FeatureGeometry::MultiPolygon(mp)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use polaris_zones_models::Category;

    use super::*;

    fn record() -> LocationRecord {
        LocationRecord::new(
            "Churchill National Park, Rowville, VIC, Australia",
            Category::Government,
        )
    }

    #[test]
    fn parses_polygon_boundary() {
        let body = serde_json::json!([{
            "display_name": "Churchill National Park, Rowville, Victoria, Australia",
            "geojson": {
                "type": "Polygon",
                "coordinates": [[[145.26, -37.93], [145.28, -37.93], [145.28, -37.95], [145.26, -37.93]]]
            }
        }]);

        let feature = parse_response(&body, &record()).unwrap();

        assert_eq!(feature.record, record());
        assert!(matches!(feature.geometry, FeatureGeometry::Polygon(_)));
        assert_eq!(feature.geometry.exterior_rings()[0].0.len(), 4);
    }

    #[test]
    fn parses_multi_polygon_boundary() {
        let body = serde_json::json!([{
            "geojson": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                ]
            }
        }]);

        let feature = parse_response(&body, &record()).unwrap();

        assert!(feature.geometry.is_multi_part());
        assert_eq!(feature.geometry.exterior_rings().len(), 2);
    }

    #[test]
    fn skips_point_results_in_favor_of_a_later_polygon() {
        let body = serde_json::json!([
            { "geojson": { "type": "Point", "coordinates": [145.0, -37.0] } },
            {
                "geojson": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            }
        ]);

        let feature = parse_response(&body, &record()).unwrap();
        assert!(matches!(feature.geometry, FeatureGeometry::Polygon(_)));
    }

    #[test]
    fn point_only_results_are_not_found() {
        let body = serde_json::json!([
            { "geojson": { "type": "Point", "coordinates": [145.0, -37.0] } }
        ]);

        assert!(matches!(
            parse_response(&body, &record()),
            Err(GeocodeError::NotFound { .. })
        ));
    }

    #[test]
    fn empty_results_are_not_found() {
        let body = serde_json::json!([]);
        assert!(matches!(
            parse_response(&body, &record()),
            Err(GeocodeError::NotFound { .. })
        ));
    }

    #[test]
    fn non_array_body_is_a_parse_error() {
        let body = serde_json::json!({ "error": "bad request" });
        assert!(matches!(
            parse_response(&body, &record()),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
