pub mod bandwidth;
pub mod connection;
pub mod error;
pub mod platform;
pub mod probe;
pub mod sampler;
pub mod snapshot;
pub mod stats;

pub use sampler::Sampler;
