pub mod docs;
pub mod health;
pub mod media;
pub mod orders;
pub mod products;
pub mod registry;
pub mod users;
