pub mod cart_items;
pub mod categories;
pub mod products;
pub mod rentals;
pub mod users;
pub mod wishlist_items;

pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use products::Entity as Products;
pub use rentals::Entity as Rentals;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
