pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod routes;
