//! Message pipeline core: classify, stamp, persist, query.
//!
//! This crate is framework-free. The REST/WebSocket layer and the SQLite
//! store plug in through the [`MessageStore`] and [`ToxicityClassifier`]
//! seams.

pub mod classifier;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod store;

pub use classifier::{KeywordClassifier, ToxicityClassifier};
pub use error::{ChatError, StoreError};
pub use model::{Message, NewMessage};
pub use pipeline::MessagePipeline;
pub use store::MessageStore;
