pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use memory::{MemoryStore, MemoryStoreFactory};
pub use repository::{ClientDataStore, StoreError};

/// Key the client record is stored under when none is given.
pub const DEFAULT_STORE_KEY: &str = "ndis-fail-safe-v2";
