//! API routes module.

pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use docs::ApiDoc;
pub use routes::create_router;
