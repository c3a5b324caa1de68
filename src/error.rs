use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarvestError {
    #[error("invalid species name: {0}")]
    InvalidSpeciesName(String),

    #[error("invalid region filter: {0}")]
    InvalidRegion(String),

    #[error("invalid quality grade: {0}")]
    InvalidQualityGrade(String),

    #[error("missing config file xeno-harvest.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("no region filter configured (set \"region\" in the config or pass --region)")]
    MissingRegion,

    #[error("xeno-canto request failed: {0}")]
    XenoHttp(String),

    #[error("xeno-canto returned status {status}: {message}")]
    XenoStatus { status: u16, message: String },

    #[error("unexpected xeno-canto response shape: {0}")]
    ApiShape(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
