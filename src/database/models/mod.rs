pub mod character_sheet;

pub use character_sheet::*;
