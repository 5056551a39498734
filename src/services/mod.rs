pub mod auth;
pub mod cache;
pub mod clock;
pub mod decorator;
pub mod factory;
pub mod hooks;
pub mod rate_limit;
pub mod tokens;
