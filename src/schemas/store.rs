use crate::models::store::Store;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct StoreCreateRequest {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct StoreWithDistance {
    #[serde(flatten)]
    pub store: Store,
    pub distance_km: f64,
}

impl From<(Store, f64)> for StoreWithDistance {
    fn from((store, distance_km): (Store, f64)) -> Self {
        Self { store, distance_km }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<f64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl NearbyQuery {
    pub fn radius_km(&self) -> f64 {
        self.radius_km.unwrap_or(5.0)
    }
}
