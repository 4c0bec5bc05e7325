//! tailor-service: bills, production workflow and shop settings for a
//! tailoring business, backed by MongoDB or an in-memory store.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
