pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryCharacterStore;
pub use repository::PgCharacterStore;
pub use store::{Capabilities, Capability, CharacterStore, StoreError, FIND_MAX_TIME};
