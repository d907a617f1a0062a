// handlers/mod.rs - Public (no auth) and protected (role-checked) tiers
pub mod protected;
pub mod public;
