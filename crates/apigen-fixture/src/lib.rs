//! Petstore handlers served through the binder module apigen generates at build time.

pub mod handlers;
pub mod models;

include!(concat!(env!("OUT_DIR"), "/routes.rs"));
