// Storage adapter: configuration, key-value slots and the persisted snapshot

pub mod config;
pub mod persister;
pub mod snapshot;
pub mod storage;

pub use config::*;
pub use persister::*;
pub use snapshot::*;
pub use storage::*;
