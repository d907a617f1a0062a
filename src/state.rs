use std::sync::Arc;

use crate::database::CharacterStore;
use crate::rbac::RoleChecker;

/// Shared, read-only handles passed to every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CharacterStore>,
    pub rbac: Arc<dyn RoleChecker>,
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn CharacterStore>, rbac: Arc<dyn RoleChecker>) -> Self {
        Self {
            store,
            rbac,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
