use std::collections::HashSet;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::InvalidCoordinate);
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::CoordinateOutOfRange);
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(value.lat, value.lng)
    }
}

#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    #[display(fmt = "Invalid coordinate: lat/lng must be finite numbers")]
    InvalidCoordinate,
    #[display(fmt = "Coordinate out of range")]
    CoordinateOutOfRange,
}

/// Great-circle distance in kilometres, rounded to metres.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let s = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * s.sqrt().atan2((1.0 - s).sqrt());
    (EARTH_RADIUS_KM * c * 1000.0).round() / 1000.0
}

/// City entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCity", into = "RawCity")]
pub struct City {
    id: String,
    name: String,
    coordinate: Coordinate,
}

impl City {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Result<Self, CityError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(CityError::BlankId);
        }
        if name.trim().is_empty() {
            return Err(CityError::BlankName);
        }
        let coordinate = Coordinate::new(lat, lng)?;
        Ok(Self {
            id,
            name,
            coordinate,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn distance_to(&self, other: &City) -> f64 {
        distance_km(&self.coordinate, &other.coordinate)
    }
}

#[derive(Serialize, Deserialize)]
struct RawCity {
    id: String,
    name: String,
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCity> for City {
    type Error = CityError;

    fn try_from(value: RawCity) -> Result<Self, Self::Error> {
        City::new(value.id, value.name, value.lat, value.lng)
    }
}

impl From<City> for RawCity {
    fn from(value: City) -> Self {
        RawCity {
            id: value.id,
            name: value.name,
            lat: value.coordinate.lat,
            lng: value.coordinate.lng,
        }
    }
}

#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityError {
    #[display(fmt = "City.id must be a non-empty string")]
    BlankId,
    #[display(fmt = "City.name must be a non-empty string")]
    BlankName,
    #[display(fmt = "{}", _0)]
    Coordinate(#[error(source)] CoordinateError),
}

impl From<CoordinateError> for CityError {
    fn from(value: CoordinateError) -> Self {
        CityError::Coordinate(value)
    }
}

/// Limits for a nearby query
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NearbyOptions {
    pub max_distance_km: f64,
    pub top_k: usize,
}

impl Default for NearbyOptions {
    fn default() -> Self {
        Self {
            max_distance_km: 300.0,
            top_k: 5,
        }
    }
}

impl NearbyOptions {
    fn validate(&self) -> Result<(), NearbyError> {
        if !(self.max_distance_km > 0.0) {
            return Err(NearbyError::InvalidMaxDistance);
        }
        if self.top_k == 0 {
            return Err(NearbyError::InvalidTopK);
        }
        Ok(())
    }
}

#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearbyError {
    #[display(fmt = "maxDistanceKm must be > 0")]
    InvalidMaxDistance,
    #[display(fmt = "topK must be > 0")]
    InvalidTopK,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearbyCity {
    pub city: City,
    pub distance_km: f64,
}

/// Drops repeated ids (first one wins) and the destination itself.
pub fn normalize_cities(destination: &City, cities: impl IntoIterator<Item = City>) -> Vec<City> {
    let mut seen = HashSet::new();
    cities
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .filter(|c| c.id != destination.id)
        .collect()
}

/// The `top_k` closest cities within `max_distance_km`, closest first.
pub fn compute_nearby(
    destination: &City,
    cities: &[City],
    options: &NearbyOptions,
) -> Result<Vec<NearbyCity>, NearbyError> {
    options.validate()?;
    let mut nearby = cities
        .iter()
        .map(|c| NearbyCity {
            city: c.clone(),
            distance_km: destination.distance_to(c),
        })
        .filter(|c| c.distance_km <= options.max_distance_km)
        .collect::<Vec<_>>();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby.truncate(options.top_k);
    Ok(nearby)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Destination,
    City,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphMeta {
    pub count: usize,
}

/// Star graph from a destination to its nearby cities
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NearbyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub meta: GraphMeta,
}

pub fn build_nearby_graph(
    destination: &City,
    cities: impl IntoIterator<Item = City>,
    options: &NearbyOptions,
) -> Result<NearbyGraph, NearbyError> {
    let cities = normalize_cities(destination, cities);
    let nearby = compute_nearby(destination, &cities, options)?;

    let nodes = std::iter::once(GraphNode {
        id: destination.id.clone(),
        label: destination.name.clone(),
        kind: NodeKind::Destination,
    })
    .chain(nearby.iter().map(|n| GraphNode {
        id: n.city.id.clone(),
        label: format!("{} ({} km)", n.city.name, n.distance_km),
        kind: NodeKind::City,
    }))
    .collect();
    let edges = nearby
        .iter()
        .map(|n| GraphEdge {
            from: destination.id.clone(),
            to: n.city.id.clone(),
            weight: n.distance_km,
        })
        .collect();

    Ok(NearbyGraph {
        nodes,
        edges,
        meta: GraphMeta {
            count: nearby.len(),
        },
    })
}
