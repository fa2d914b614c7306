use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, Rental};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtendRentalRequest {
    /// Additional months to add on top of the current duration.
    pub duration: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignAgreementRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RentalWithProduct {
    pub rental: Rental,
    /// None when the product has been removed from the catalog since checkout.
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RentalList {
    pub items: Vec<RentalWithProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResult {
    pub rentals: Vec<Rental>,
}

/// Public view of the renting user on the agreement page; the password hash
/// never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgreementDto {
    pub rental: Rental,
    pub product: Product,
    pub user: UserProfile,
}
