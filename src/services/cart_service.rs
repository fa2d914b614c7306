use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList, DEFAULT_RENTAL_MONTHS},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    duration: i32,
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    category_id: Uuid,
    material: Option<String>,
    dimensions: Option<String>,
    color: Option<String>,
    image_url: Option<String>,
    trending: bool,
    is_new_arrival: bool,
    created_at: DateTime<Utc>,
}

impl CartWithProductRow {
    fn into_dto(self) -> CartItemDto {
        CartItemDto {
            id: self.cart_id,
            duration: self.duration,
            product: Product {
                id: self.product_id,
                name: self.name,
                description: self.description,
                price: self.price,
                category_id: self.category_id,
                material: self.material,
                dimensions: self.dimensions,
                color: self.color,
                image_url: self.image_url,
                trending: self.trending,
                is_new_arrival: self.is_new_arrival,
                created_at: self.created_at,
            },
        }
    }
}

const CART_JOIN_SELECT: &str = r#"
    SELECT ci.id AS cart_id, ci.duration,
           p.id AS product_id, p.name, p.description, p.price, p.category_id,
           p.material, p.dimensions, p.color, p.image_url,
           p.trending, p.is_new_arrival, p.created_at
    FROM cart_items ci
    JOIN products p ON p.id = ci.product_id
"#;

/// All cart entries for the user, joined with the product's current display
/// fields. The join happens at read time, so prices reflect the catalog now,
/// not a snapshot taken when the item was added.
pub async fn list_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(&format!(
        "{CART_JOIN_SELECT} WHERE ci.user_id = $1 ORDER BY ci.created_at DESC"
    ))
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let items: Vec<CartItemDto> = rows.into_iter().map(CartWithProductRow::into_dto).collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Add a product to the cart. A second add for the same product overwrites
/// the stored duration; the (user_id, product_id) unique index makes this an
/// upsert rather than an application-level check-then-act.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let duration = payload.duration.unwrap_or(DEFAULT_RENTAL_MONTHS);
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "duration must be a positive number of months".to_string(),
        ));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let cart_item: CartItem = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, duration)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET duration = EXCLUDED.duration, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(duration)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "duration": duration })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

/// Overwrite the duration of an existing cart entry. Unlike add_to_cart this
/// fails with 404 when the product is not in the cart.
pub async fn update_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    duration: i32,
) -> AppResult<ApiResponse<CartItemDto>> {
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "duration must be a positive number of months".to_string(),
        ));
    }

    let updated = sqlx::query(
        r#"
        UPDATE cart_items
        SET duration = $3, updated_at = now()
        WHERE user_id = $1 AND product_id = $2
        "#,
    )
    .bind(user.user_id)
    .bind(product_id)
    .bind(duration)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let row = sqlx::query_as::<_, CartWithProductRow>(&format!(
        "{CART_JOIN_SELECT} WHERE ci.user_id = $1 AND ci.product_id = $2"
    ))
    .bind(user.user_id)
    .bind(product_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id, "duration": duration })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Updated", row.into_dto(), None))
}

/// Idempotent: removing an absent entry is still a success.
pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

/// Idempotent: clearing an already-empty cart is a success.
pub async fn clear_cart(pool: &DbPool, user: &AuthUser) -> AppResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_clear",
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}
