#[path = "../common/mod.rs"]
#[macro_use]
pub mod common;

mod auth;
mod health;
