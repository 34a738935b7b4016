pub mod client;
pub mod config;
pub mod errors;
pub mod form;
pub mod helpers;
pub mod models;
pub mod registry;
pub mod routes;
pub mod server;
pub mod signup;
pub mod validation;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;
