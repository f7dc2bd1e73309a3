pub mod api_docs;
pub mod config;
pub mod controllers;
pub mod db_config;
pub mod files;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod types;
