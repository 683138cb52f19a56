pub mod core;
pub mod db;
pub mod hbnb_web_server;
pub mod models;
pub mod routes;
pub mod templates;
