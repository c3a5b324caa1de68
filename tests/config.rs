use std::collections::BTreeSet;

use assert_matches::assert_matches;

use xeno_harvest::config::{ConfigLoader, ConfigOverrides};
use xeno_harvest::domain::QualityGrade;
use xeno_harvest::error::HarvestError;

#[test]
fn resolve_full_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("xeno-harvest.json");
    std::fs::write(
        &path,
        r#"{
            "species": ["centropus sinensis", "athene brama"],
            "quota": 10,
            "region": "thailand",
            "quality": ["A", "B", "C"],
            "output": "clips",
            "download_timeout_secs": 20
        }"#,
    )
    .unwrap();

    let resolved =
        ConfigLoader::resolve(path.to_str(), ConfigOverrides::default()).unwrap();
    assert_eq!(resolved.species.len(), 2);
    assert_eq!(resolved.species[1].as_str(), "athene brama");
    assert_eq!(resolved.quota, 10);
    assert_eq!(resolved.region.as_str(), "thailand");
    assert_eq!(
        resolved.quality,
        BTreeSet::from([QualityGrade::A, QualityGrade::B, QualityGrade::C])
    );
    assert_eq!(resolved.output_root, "clips");
}

#[test]
fn resolve_rejects_unreadable_json() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("xeno-harvest.json");
    std::fs::write(&path, "{not json").unwrap();

    let err =
        ConfigLoader::resolve(path.to_str(), ConfigOverrides::default()).unwrap_err();
    assert_matches!(err, HarvestError::ConfigParse(_));
}

#[test]
fn single_species_override_needs_no_config_file() {
    let overrides = ConfigOverrides {
        species: Some("athene brama".to_string()),
        region: Some("india".to_string()),
        ..ConfigOverrides::default()
    };
    let resolved = ConfigLoader::resolve(None, overrides).unwrap();
    assert_eq!(resolved.species.len(), 1);
    assert_eq!(resolved.species[0].as_str(), "athene brama");
    assert_eq!(resolved.region.as_str(), "india");
}
