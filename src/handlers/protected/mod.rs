// handlers/protected/mod.rs - Handlers for any signed-in account
//
// Route Prefix: /api
pub mod data;
pub mod listings;
pub mod session;
pub mod upload;
