pub mod health;
pub mod schema;
