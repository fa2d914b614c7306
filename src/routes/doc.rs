use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        categories::CategoryList,
        products::ProductList,
        rentals::{
            AgreementDto, CheckoutResult, ExtendRentalRequest, RentalList, RentalWithProduct,
            SignAgreementRequest, UserProfile,
        },
        wishlist::{AddToWishlistRequest, WishlistProductList},
    },
    models::{CartItem, Category, Product, Rental, RentalStatus, User, WishlistItem},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, params, products, rentals, wishlist},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::get_product,
        products::related_products,
        categories::list_categories,
        categories::get_category,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        rentals::checkout,
        rentals::list_rentals,
        rentals::extend_rental,
        rentals::get_agreement,
        rentals::sign_agreement
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            CartItem,
            WishlistItem,
            Rental,
            RentalStatus,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            AddToWishlistRequest,
            WishlistProductList,
            ExtendRentalRequest,
            SignAgreementRequest,
            RentalWithProduct,
            RentalList,
            CheckoutResult,
            AgreementDto,
            UserProfile,
            ProductList,
            CategoryList,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryList>,
            ApiResponse<CartList>,
            ApiResponse<RentalList>,
            ApiResponse<CheckoutResult>,
            ApiResponse<AgreementDto>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog product endpoints"),
        (name = "Categories", description = "Catalog category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Rentals", description = "Checkout and rental lifecycle endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
