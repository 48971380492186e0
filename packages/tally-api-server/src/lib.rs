pub mod api;
pub mod cli;
pub(crate) mod commands;
pub mod models;
mod uses;
