pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{
    ContentItem, InMemoryContentSource, InMemoryProgressStore, ManualTrigger,
};
#[cfg(feature = "database")]
pub use postgres::{PostgresContentSource, PostgresProgressStore};
