pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod folders;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod search;
pub mod types;
