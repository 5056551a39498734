/*
 * Responsibility
 * - Admission of bearer tokens (authenticator)
 * - Request-scoped record of who was admitted (context)
 */
pub mod authenticator;
pub mod context;

pub use authenticator::Authenticator;
pub use context::{AuthenticatedContext, RequestScope};
