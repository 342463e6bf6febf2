//! API clients for external services
//!
//! - Jikan: anime metadata, episode lists, recommendations
//! - Consumet: streaming-catalog search and source resolution

pub mod consumet;
pub mod jikan;

pub use consumet::ConsumetClient;
pub use jikan::JikanClient;
