#![forbid(unsafe_code)]

//! Shared pieces of the nicodata tools.
//!
//! Each binary under `src/bin` is a one-shot command that reads or patches the
//! JSON data files consumed by the site. The library keeps the record layout,
//! file handling and network plumbing in one place so the commands stay thin.

pub mod config;
pub mod download;
pub mod http;
pub mod importer;
pub mod logging;
pub mod nicovideo;
pub mod placeholder;
pub mod platform;
pub mod record;
pub mod scan;
pub mod store;
pub mod thumbnails;
