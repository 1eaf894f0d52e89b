// dexsync-api: Async Rust client for the PokeAPI catalog.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{
    CatalogClient, DEFAULT_BASE_URL, DEFAULT_PROBE_ID, DEFAULT_SPRITE_BASE_URL, RetryPolicy,
};
pub use error::Error;
pub use models::{Page, PokemonDetail, ResourceRef, resource_id};
pub use transport::TransportConfig;
