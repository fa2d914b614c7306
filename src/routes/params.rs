use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog listing filter. Provided fields combine with logical AND; a field
/// left out of the query string is not filtered on. The camelCase aliases
/// match what the web client sends.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(alias = "categoryId")]
    pub category_id: Option<Uuid>,
    pub trending: Option<bool>,
    #[serde(alias = "isNewArrival", alias = "isNewProduct")]
    pub is_new_arrival: Option<bool>,
}
