// handlers/elevated/mod.rs - Account administration (admin and super-admin)
pub mod admin;
