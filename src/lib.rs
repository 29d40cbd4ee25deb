//! A small activity logger ("mind") that buckets interactions into hourly
//! counters, plus the single-slot "void" endpoint minds sync through.

pub mod commands;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
