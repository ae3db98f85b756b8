//! Status surface.
//!
//! Serves the engine's latest state as JSON and as a small HTML widget.

mod dto;
mod routes;
mod state;
mod templates;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
pub use templates::*;
