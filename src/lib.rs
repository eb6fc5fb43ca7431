#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod archive;
pub mod archiver;
pub mod error;
pub mod fetch;
pub mod models;
pub mod page;
pub mod schema;
pub mod store;
