//! HTTP API handlers for the songbook server

pub mod health;
pub mod selection;
pub mod songs;
pub mod tabs;

pub use health::health_routes;
pub use selection::selection_routes;
pub use songs::song_routes;
pub use tabs::tab_routes;
