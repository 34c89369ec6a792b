//! Domain models serialized to the JSON API.

pub mod category;
pub mod product;
pub mod subscriber;

pub use category::{Category, CategoryWithCount};
pub use product::Product;
pub use subscriber::Subscriber;
