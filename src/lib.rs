pub mod config;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod metadata;
pub mod output;
pub mod store;
pub mod transcode;
pub mod xeno;
