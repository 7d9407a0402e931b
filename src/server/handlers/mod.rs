//! HTTP handlers for the server.

pub mod auth;
pub mod companies;
pub mod invoices;
pub mod render;
pub mod status;
pub mod templates;
