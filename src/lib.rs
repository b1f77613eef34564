// src/lib.rs

//! BDE Scraper Library
//!
//! Collects student association contact details from a paginated directory
//! site into CSV files.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod source;
pub mod storage;
pub mod utils;
