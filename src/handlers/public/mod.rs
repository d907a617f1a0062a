// handlers/public/mod.rs - Unauthenticated liveness and readiness probes

pub mod health;

pub use health::{health, ping, HealthCheckResponse};
