pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod rental_service;
pub mod wishlist_service;
