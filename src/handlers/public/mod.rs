// handlers/public/mod.rs - Public handlers (no session required)
//
// Registration, login/logout and the page shells behind the gate.
pub mod auth;
pub mod pages;
