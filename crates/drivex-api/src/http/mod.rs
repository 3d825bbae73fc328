//! HTTP endpoint implementations.

mod routes;
mod state;


pub use routes::{
    create_router, create_router_with_body_limit, create_router_with_observability,
    create_router_with_observability_and_limit, ApiError, DEFAULT_BODY_LIMIT,
};
pub use state::AppState;
