pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
