pub mod context;
pub mod handlers;
pub mod orchestrator;
pub mod personas;
