use chrono::{Months, NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::rentals::{
        AgreementDto, CheckoutResult, ExtendRentalRequest, RentalList, RentalWithProduct,
        SignAgreementRequest, UserProfile,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        products::Entity as Products,
        rentals::{
            ActiveModel as RentalActive, Column as RentalCol, Entity as Rentals,
            Model as RentalModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Rental, RentalStatus},
    response::{ApiResponse, Meta},
    services::catalog_service::product_from_entity,
    state::AppState,
};

/// Calendar month-add for rental periods. Month-end start dates clamp rather
/// than overflow (Jan 31 + 1 month is Feb 28/29, not Mar 2/3).
fn rental_end_date(start: NaiveDate, months: i32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months as u32))
}

/// Integer minor-unit arithmetic; price is a per-month rate.
fn rental_total(monthly_price: i64, months: i32) -> i64 {
    monthly_price * months as i64
}

/// Convert the user's cart into one rental per item and clear the cart, all
/// inside a single transaction. A missing product fails the whole checkout,
/// and a crash before commit leaves neither rentals nor a half-cleared cart.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CheckoutResult>> {
    let txn = state.orm.begin().await?;

    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if cart_rows.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let today = Utc::now().date_naive();
    let mut rentals: Vec<Rental> = Vec::with_capacity(cart_rows.len());

    for item in &cart_rows {
        if item.duration <= 0 {
            return Err(AppError::BadRequest(
                "cart has an invalid rental duration".into(),
            ));
        }

        let product = Products::find_by_id(item.product_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let end_date = rental_end_date(today, item.duration)
            .ok_or_else(|| AppError::BadRequest("rental end date out of range".into()))?;

        let rental = RentalActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(item.product_id),
            start_date: Set(today),
            end_date: Set(end_date),
            duration: Set(item.duration),
            total_amount: Set(rental_total(product.price, item.duration)),
            status: Set(RentalStatus::Pending.as_str().into()),
            payment_method: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        rentals.push(rental_from_entity(rental)?);
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("rentals"),
        Some(serde_json::json!({ "rental_count": rentals.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResult { rentals },
        Some(Meta::empty()),
    ))
}

pub async fn list_rentals(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RentalList>> {
    let rows = Rentals::find()
        .filter(RentalCol::UserId.eq(user.user_id))
        .order_by_desc(RentalCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (rental, product) in rows {
        items.push(RentalWithProduct {
            rental: rental_from_entity(rental)?,
            product: product.map(product_from_entity),
        });
    }

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Rentals", RentalList { items }, Some(meta)))
}

/// Add months to a running rental: duration grows, end_date moves by the same
/// number of calendar months. Whether total_amount is recomputed from the
/// product's current monthly price is a deployment policy
/// (`RENTAL_REPRICE_ON_EXTEND`, default on).
pub async fn extend_rental(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ExtendRentalRequest,
) -> AppResult<ApiResponse<Rental>> {
    if payload.duration <= 0 {
        return Err(AppError::BadRequest(
            "duration must be a positive number of months".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let rental = Rentals::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if rental.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let status = parse_status(&rental.status)?;
    if !status.can_extend() {
        return Err(AppError::BadRequest(format!(
            "a {} rental cannot be extended",
            status.as_str()
        )));
    }

    let new_duration = rental.duration + payload.duration;
    let new_end_date = rental_end_date(rental.end_date, payload.duration)
        .ok_or_else(|| AppError::BadRequest("rental end date out of range".into()))?;

    let new_total = if state.config.reprice_on_extend {
        let product = Products::find_by_id(rental.product_id).one(&txn).await?;
        match product {
            Some(p) => Some(rental_total(p.price, new_duration)),
            // Product withdrawn from the catalog; keep the recorded amount.
            None => None,
        }
    } else {
        None
    };

    let mut active: RentalActive = rental.into();
    active.duration = Set(new_duration);
    active.end_date = Set(new_end_date);
    if let Some(total) = new_total {
        active.total_amount = Set(total);
    }
    active.updated_at = Set(Utc::now().into());
    let rental = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "rental_extend",
        Some("rentals"),
        Some(serde_json::json!({ "rental_id": id, "added_months": payload.duration })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Rental extended",
        rental_from_entity(rental)?,
        Some(Meta::empty()),
    ))
}

/// pending -> signed, capturing the payment method. Re-signing is rejected so
/// a second call cannot silently overwrite the recorded payment method.
pub async fn sign_agreement(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SignAgreementRequest,
) -> AppResult<ApiResponse<Rental>> {
    let payment_method = payload.payment_method.trim();
    if payment_method.is_empty() {
        return Err(AppError::BadRequest("payment method is required".into()));
    }

    let txn = state.orm.begin().await?;

    let rental = Rentals::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if rental.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let status = parse_status(&rental.status)?;
    if status == RentalStatus::Signed {
        return Err(AppError::BadRequest(
            "rental agreement already signed".into(),
        ));
    }
    if !status.can_sign() {
        return Err(AppError::BadRequest(format!(
            "a {} rental cannot be signed",
            status.as_str()
        )));
    }

    let mut active: RentalActive = rental.into();
    active.status = Set(RentalStatus::Signed.as_str().into());
    active.payment_method = Set(Some(payment_method.to_string()));
    active.updated_at = Set(Utc::now().into());
    let rental = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "rental_sign",
        Some("rentals"),
        Some(serde_json::json!({ "rental_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Agreement signed",
        rental_from_entity(rental)?,
        Some(Meta::empty()),
    ))
}

/// Everything the agreement page needs: the rental, the rented product, and
/// the renting user's public profile.
pub async fn get_agreement(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AgreementDto>> {
    let rental = Rentals::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if rental.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let product = Products::find_by_id(rental.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let renter = Users::find_by_id(rental.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let data = AgreementDto {
        rental: rental_from_entity(rental)?,
        product: product_from_entity(product),
        user: UserProfile {
            id: renter.id,
            email: renter.email,
        },
    };

    Ok(ApiResponse::success("Agreement", data, None))
}

fn parse_status(value: &str) -> AppResult<RentalStatus> {
    RentalStatus::parse(value)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown rental status {value:?}")))
}

fn rental_from_entity(model: RentalModel) -> AppResult<Rental> {
    let status = parse_status(&model.status)?;
    Ok(Rental {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        start_date: model.start_date,
        end_date: model.end_date,
        duration: model.duration,
        total_amount: model.total_amount,
        status,
        payment_method: model.payment_method,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_date_adds_calendar_months() {
        assert_eq!(
            rental_end_date(date(2024, 1, 1), 3),
            Some(date(2024, 4, 1))
        );
        assert_eq!(
            rental_end_date(date(2024, 1, 1), 6),
            Some(date(2024, 7, 1))
        );
    }

    #[test]
    fn end_date_clamps_at_month_end() {
        // Jan 31 + 1 month must not overflow into March.
        assert_eq!(
            rental_end_date(date(2024, 1, 31), 1),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            rental_end_date(date(2023, 1, 31), 1),
            Some(date(2023, 2, 28))
        );
        assert_eq!(
            rental_end_date(date(2024, 10, 31), 1),
            Some(date(2024, 11, 30))
        );
    }

    #[test]
    fn extension_moves_end_date_by_added_months() {
        let end = rental_end_date(date(2024, 1, 1), 3).unwrap();
        assert_eq!(end, date(2024, 4, 1));
        assert_eq!(rental_end_date(end, 3), Some(date(2024, 7, 1)));
    }

    #[test]
    fn totals_multiply_monthly_price_by_duration() {
        assert_eq!(rental_total(500, 3), 1500);
        assert_eq!(rental_total(1000, 6), 6000);
    }
}
