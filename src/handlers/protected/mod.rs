// handlers/protected/mod.rs - Handlers gated by a role check against the token decoder service

pub mod sheet;

pub use sheet::*;
