use diesel::{AsChangeset, Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Queryable, QueryableByName, Selectable, Identifiable, Serialize, Deserialize, ToSchema, Debug,
    Clone,
)]
#[diesel(table_name = crate::db::schema::stores)]
#[diesel(primary_key(store_id))]
pub struct Store {
    pub store_id: i32,
    pub owner_id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::stores)]
pub struct NewStore {
    pub owner_id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(AsChangeset, Debug, Default, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::stores)]
pub struct UpdateStore {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
