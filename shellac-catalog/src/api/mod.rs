//! HTTP read surface
//!
//! The server only reads the catalog; all writes happen in the
//! synchronization pass before it starts.

pub mod health;
pub mod songs;

pub use health::health_routes;
pub use songs::song_routes;
