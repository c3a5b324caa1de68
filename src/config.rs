use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{QualityGrade, Region, SpeciesName};
use crate::error::HarvestError;

pub const DEFAULT_QUOTA: u32 = 50;
pub const DEFAULT_OUTPUT_ROOT: &str = "xeno_audio";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 10;

/// Raw shape of `xeno-harvest.json`. Everything except the species list is
/// optional and falls back to the reference defaults.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub quota: Option<u32>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub quality: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub download_timeout_secs: Option<u64>,
}

/// Validated configuration the harvester runs against.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub species: Vec<SpeciesName>,
    pub quota: u32,
    pub region: Region,
    pub quality: BTreeSet<QualityGrade>,
    pub output_root: Utf8PathBuf,
    pub download_timeout: Duration,
}

/// CLI values layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub species: Option<String>,
    pub region: Option<String>,
    pub quota: Option<u32>,
    pub output: Option<String>,
    pub download_timeout_secs: Option<u64>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, HarvestError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("xeno-harvest.json"),
        };

        if path.is_none() && !config_path.exists() {
            // A single-species invocation works without any config file.
            if overrides.species.is_some() {
                return Self::resolve_config(Config::empty(), overrides);
            }
            return Err(HarvestError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HarvestError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| HarvestError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, HarvestError> {
        let species = match overrides.species {
            Some(single) => vec![single.parse::<SpeciesName>()?],
            None => config
                .species
                .iter()
                .map(|name| name.parse::<SpeciesName>())
                .collect::<Result<Vec<_>, HarvestError>>()?,
        };

        let region = overrides
            .region
            .or(config.region)
            .ok_or(HarvestError::MissingRegion)?
            .parse::<Region>()?;

        let quality = match config.quality {
            Some(grades) => grades
                .iter()
                .map(|grade| grade.parse::<QualityGrade>())
                .collect::<Result<BTreeSet<_>, HarvestError>>()?,
            None => default_quality_set(),
        };

        let output_root = Utf8PathBuf::from(
            overrides
                .output
                .or(config.output)
                .unwrap_or_else(|| DEFAULT_OUTPUT_ROOT.to_string()),
        );

        let timeout_secs = overrides
            .download_timeout_secs
            .or(config.download_timeout_secs)
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS);

        Ok(ResolvedConfig {
            species,
            quota: overrides.quota.or(config.quota).unwrap_or(DEFAULT_QUOTA),
            region,
            quality,
            output_root,
            download_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Config {
    fn empty() -> Self {
        Config {
            species: Vec::new(),
            quota: None,
            region: None,
            quality: None,
            output: None,
            download_timeout_secs: None,
        }
    }
}

pub fn default_quality_set() -> BTreeSet<QualityGrade> {
    BTreeSet::from([QualityGrade::A, QualityGrade::B])
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config_with_region() -> Config {
        Config {
            species: vec!["centropus sinensis".to_string()],
            quota: None,
            region: Some("thailand".to_string()),
            quality: None,
            output: None,
            download_timeout_secs: None,
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let resolved =
            ConfigLoader::resolve_config(config_with_region(), ConfigOverrides::default()).unwrap();
        assert_eq!(resolved.quota, DEFAULT_QUOTA);
        assert_eq!(resolved.quality, default_quality_set());
        assert_eq!(resolved.output_root, DEFAULT_OUTPUT_ROOT);
        assert_eq!(
            resolved.download_timeout,
            Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS)
        );
    }

    #[test]
    fn resolve_without_region_fails() {
        let mut config = config_with_region();
        config.region = None;
        let err =
            ConfigLoader::resolve_config(config, ConfigOverrides::default()).unwrap_err();
        assert_matches!(err, HarvestError::MissingRegion);
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = ConfigOverrides {
            species: Some("athene brama".to_string()),
            region: Some("india".to_string()),
            quota: Some(3),
            output: Some("clips".to_string()),
            download_timeout_secs: Some(30),
        };
        let resolved = ConfigLoader::resolve_config(config_with_region(), overrides).unwrap();
        assert_eq!(resolved.species.len(), 1);
        assert_eq!(resolved.species[0].as_str(), "athene brama");
        assert_eq!(resolved.region.as_str(), "india");
        assert_eq!(resolved.quota, 3);
        assert_eq!(resolved.output_root, "clips");
        assert_eq!(resolved.download_timeout, Duration::from_secs(30));
    }

    #[test]
    fn bad_quality_grade_rejected() {
        let mut config = config_with_region();
        config.quality = Some(vec!["A".to_string(), "Z".to_string()]);
        let err =
            ConfigLoader::resolve_config(config, ConfigOverrides::default()).unwrap_err();
        assert_matches!(err, HarvestError::InvalidQualityGrade(_));
    }
}
