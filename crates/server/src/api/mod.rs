pub mod attachment;
pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod routes;
pub mod tasks;

pub use routes::create_router;
