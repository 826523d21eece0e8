//! Core data structures: configuration, cancellation, and the counting
//! layers the filter stacks.

pub mod cancel;
pub mod config;
pub mod layer;
pub mod store;

pub use cancel::CancelToken;
pub use config::{BitWidth, Coordinate, ExhaustionPolicy, FilterConfig, LayerConfig};
pub use layer::{CounterLayer, LayerStats};
pub use store::CounterStore;
