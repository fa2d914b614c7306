use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Category;

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
