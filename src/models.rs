use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog product. `price` is the monthly rental rate in currency minor units.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Uuid,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub trending: bool,
    pub is_new_arrival: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry per (user, product); adding the same product again overwrites
/// the duration instead of creating a second row.
#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub duration: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Rental {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: i32,
    pub total_amount: i64,
    pub status: RentalStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rental lifecycle. Checkout creates rentals as `Pending`; signing the
/// agreement moves them to `Signed`. `Completed` and `Cancelled` are set only
/// through direct admin mutation, which has no route here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Active,
    Signed,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Signed => "signed",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RentalStatus::Pending),
            "active" => Some(RentalStatus::Active),
            "signed" => Some(RentalStatus::Signed),
            "completed" => Some(RentalStatus::Completed),
            "cancelled" => Some(RentalStatus::Cancelled),
            _ => None,
        }
    }

    /// Extension keeps the rental in its current state; it is only allowed
    /// while the rental is still running.
    pub fn can_extend(&self) -> bool {
        matches!(
            self,
            RentalStatus::Pending | RentalStatus::Active | RentalStatus::Signed
        )
    }

    pub fn can_sign(&self) -> bool {
        matches!(self, RentalStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            RentalStatus::Pending,
            RentalStatus::Active,
            RentalStatus::Signed,
            RentalStatus::Completed,
            RentalStatus::Cancelled,
        ] {
            assert_eq!(RentalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RentalStatus::parse("paid"), None);
    }

    #[test]
    fn only_pending_rentals_can_be_signed() {
        assert!(RentalStatus::Pending.can_sign());
        assert!(!RentalStatus::Signed.can_sign());
        assert!(!RentalStatus::Cancelled.can_sign());
    }

    #[test]
    fn finished_rentals_cannot_be_extended() {
        assert!(RentalStatus::Active.can_extend());
        assert!(RentalStatus::Signed.can_extend());
        assert!(!RentalStatus::Completed.can_extend());
        assert!(!RentalStatus::Cancelled.can_extend());
    }
}
