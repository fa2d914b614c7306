use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::rentals::{
        AgreementDto, CheckoutResult, ExtendRentalRequest, RentalList, SignAgreementRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Rental,
    response::ApiResponse,
    services::rental_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rentals))
        .route("/{id}/extend", put(extend_rental))
        .route("/{id}/agreement", get(get_agreement))
        .route("/{id}/sign", post(sign_agreement))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    responses(
        (status = 201, description = "Cart converted into rentals", body = ApiResponse<CheckoutResult>),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "A cart product no longer exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rentals"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<CheckoutResult>>)> {
    let resp = rental_service::checkout(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/rentals",
    responses(
        (status = 200, description = "List the caller's rentals joined with products", body = ApiResponse<RentalList>),
        (status = 401, description = "Unauthenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rentals"
)]
pub async fn list_rentals(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RentalList>>> {
    let resp = rental_service::list_rentals(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/rentals/{id}/extend",
    params(
        ("id" = Uuid, Path, description = "Rental ID")
    ),
    request_body = ExtendRentalRequest,
    responses(
        (status = 200, description = "Rental extended", body = ApiResponse<Rental>),
        (status = 400, description = "Non-positive duration or rental not extendable"),
        (status = 403, description = "Rental belongs to another user"),
        (status = 404, description = "Rental not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rentals"
)]
pub async fn extend_rental(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtendRentalRequest>,
) -> AppResult<Json<ApiResponse<Rental>>> {
    let resp = rental_service::extend_rental(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rentals/{id}/agreement",
    params(
        ("id" = Uuid, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Agreement data", body = ApiResponse<AgreementDto>),
        (status = 403, description = "Rental belongs to another user"),
        (status = 404, description = "Rental not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rentals"
)]
pub async fn get_agreement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<AgreementDto>>> {
    let resp = rental_service::get_agreement(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/rentals/{id}/sign",
    params(
        ("id" = Uuid, Path, description = "Rental ID")
    ),
    request_body = SignAgreementRequest,
    responses(
        (status = 200, description = "Agreement signed", body = ApiResponse<Rental>),
        (status = 400, description = "Missing payment method or rental not signable"),
        (status = 403, description = "Rental belongs to another user"),
        (status = 404, description = "Rental not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rentals"
)]
pub async fn sign_agreement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SignAgreementRequest>,
) -> AppResult<Json<ApiResponse<Rental>>> {
    let resp = rental_service::sign_agreement(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
