//! Building blocks: configuration, validation, library lookup and the
//! extension-aware connection.

pub mod config;
pub mod database;
pub mod error;
pub mod library;
pub mod validation;
