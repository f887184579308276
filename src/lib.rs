// src/lib.rs

//! Course Catalogue Library
//!
//! Crawls a university course query system into an in-memory store and
//! serves it over HTTP.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
