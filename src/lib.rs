//! Núcleo de autorização baseada em relações (ReBAC) para organizações e projetos.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use common::{context::RequestContext, error::AppError};
pub use config::{AppState, Config};
