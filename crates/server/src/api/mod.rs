pub mod bulk;
pub mod handlers;
pub mod middleware;
pub mod presets;
pub mod quick_filters;
pub mod routes;
pub mod view;

pub use routes::create_router;
