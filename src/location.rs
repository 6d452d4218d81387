//! Road name and municipality resolution.
//!
//! Two `LocationResolver` implementations exist and one is picked at startup:
//! - `HeuristicResolver` names roads after the running sensor counter and
//!   splits municipalities on a fixed latitude line.
//! - `GeocodingResolver` asks a `ReverseGeocoder` for each new location, with
//!   a per-rebuild `LocationCache` bounding the number of distinct lookups.
//!
//! Geocoding failures never escape this module; the defaults are used instead.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    models::{CHANDIGARH_MC, MOHALI_MC},
    rqi::round_to,
    Config,
};

// ---

/// Readings south of this latitude default to Mohali.
const MOHALI_LATITUDE_LINE: f64 = 30.75;

const USER_AGENT: &str = concat!("roadwatch-rqi/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub road_name: String,
    pub municipality: String,
}

impl Location {
    /// Fallback naming used whenever no geocoded value is available.
    pub fn default_for(latitude: f64, counter: u64) -> Self {
        // ---
        let municipality = if latitude < MOHALI_LATITUDE_LINE {
            MOHALI_MC
        } else {
            CHANDIGARH_MC
        };
        Location {
            road_name: format!("Road {counter}"),
            municipality: municipality.to_string(),
        }
    }
}

/// Result of a reverse geocoding call; either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodedPlace {
    pub road: Option<String>,
    pub municipality: Option<String>,
}

impl GeocodedPlace {
    fn or_default(&self, fallback: Location) -> Location {
        Location {
            road_name: self.road.clone().unwrap_or(fallback.road_name),
            municipality: self.municipality.clone().unwrap_or(fallback.municipality),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned an error: {0}")]
    Service(String),
}

/// External reverse geocoding collaborator.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<GeocodedPlace, GeocodeError>;
}

/// Memo of geocoded places for one rebuild, keyed by rounded coordinates.
#[derive(Debug, Default)]
pub struct LocationCache {
    entries: HashMap<String, GeocodedPlace>,
}

impl LocationCache {
    // ---
    pub fn key(lat: f64, lng: f64) -> String {
        format!("{},{}", round_to(lat, 4), round_to(lng, 4))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Capability assigning a road and municipality to a reading.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// `counter` is the 1-based position of the reading in the rebuild.
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
        counter: u64,
        cache: &mut LocationCache,
    ) -> Location;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicResolver;

#[async_trait]
impl LocationResolver for HeuristicResolver {
    async fn resolve(
        &self,
        latitude: f64,
        _longitude: f64,
        counter: u64,
        _cache: &mut LocationCache,
    ) -> Location {
        Location::default_for(latitude, counter)
    }
}

pub struct GeocodingResolver {
    geocoder: Arc<dyn ReverseGeocoder>,
    max_locations: usize,
}

impl GeocodingResolver {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, max_locations: usize) -> Self {
        GeocodingResolver {
            geocoder,
            max_locations,
        }
    }
}

#[async_trait]
impl LocationResolver for GeocodingResolver {
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
        counter: u64,
        cache: &mut LocationCache,
    ) -> Location {
        // ---
        let fallback = Location::default_for(latitude, counter);
        let key = LocationCache::key(latitude, longitude);

        if let Some(place) = cache.entries.get(&key) {
            return place.or_default(fallback);
        }
        if cache.len() >= self.max_locations {
            return fallback;
        }

        debug!("Geocoding location {}: {}, {}", cache.len() + 1, latitude, longitude);
        let place = match self.geocoder.reverse_geocode(latitude, longitude).await {
            Ok(place) => place,
            Err(e) => {
                warn!("Geocoding failed for {}, {}: {}", latitude, longitude, e);
                // Remember the defaults so this key is not retried.
                GeocodedPlace {
                    road: Some(fallback.road_name.clone()),
                    municipality: Some(fallback.municipality.clone()),
                }
            }
        };

        let location = place.or_default(fallback);
        cache.entries.insert(key, place);
        location
    }
}

/// Pick the resolver implementation for this process.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn LocationResolver>> {
    // ---
    if !config.enable_geocoding {
        tracing::info!("Geocoding disabled, using latitude heuristic for municipalities");
        return Ok(Arc::new(HeuristicResolver));
    }

    let geocoder = NominatimGeocoder::new(&config.geocoder_url, config.geocode_timeout)?;
    tracing::info!("Geocoding enabled via {}", config.geocoder_url);
    Ok(Arc::new(GeocodingResolver::new(
        Arc::new(geocoder),
        config.geocode_max_locations,
    )))
}

// ---

/// Reverse geocoder backed by a Nominatim-compatible `/reverse` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    error: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
}

impl NominatimGeocoder {
    // ---
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(NominatimGeocoder {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<GeocodedPlace, GeocodeError> {
        // ---
        let url = format!("{}/reverse", self.base_url);
        let response: ReverseResponse = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(message) = response.error {
            return Err(GeocodeError::Service(message));
        }
        Ok(place_from_address(response.address.unwrap_or_default()))
    }
}

fn place_from_address(address: NominatimAddress) -> GeocodedPlace {
    // ---
    let locality = [
        &address.city,
        &address.town,
        &address.village,
        &address.county,
        &address.state_district,
    ];

    let named: Vec<&str> = locality
        .iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    let municipality = named
        .iter()
        .find_map(|name| known_municipality(name))
        .or(named.first().copied())
        .map(str::to_string);

    GeocodedPlace {
        road: address.road,
        municipality,
    }
}

fn known_municipality(locality: &str) -> Option<&'static str> {
    if locality.contains("Mohali") || locality.contains("Sahibzada Ajit Singh Nagar") {
        Some(MOHALI_MC)
    } else if locality.contains("Chandigarh") {
        Some(CHANDIGARH_MC)
    } else {
        None
    }
}
