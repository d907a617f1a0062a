pub mod collection;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as sheet_list;
pub use collection::post as sheet_insert;

pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;
