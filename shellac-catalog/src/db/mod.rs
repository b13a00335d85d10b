//! Catalog store operations
//!
//! One module per entity kind. All operations take the shared pool and
//! upsert by natural key: look up first, update in place on a hit,
//! insert otherwise. Re-running an upsert with unchanged data never
//! creates a second row.

pub mod albums;
pub mod artists;
pub mod genres;
pub mod songs;
