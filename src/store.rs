use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::{QualityGrade, Recording, SpeciesName};
use crate::error::HarvestError;

pub const METADATA_FILE: &str = "metadata.csv";

/// Filesystem layout under the output root: one directory per species, one
/// WAV per committed recording, plus a single metadata table at the root.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: Utf8PathBuf,
}

impl OutputStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), HarvestError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| HarvestError::Filesystem(err.to_string()))
    }

    pub fn species_dir(&self, species: &SpeciesName) -> Utf8PathBuf {
        self.root.join(species.dir_name())
    }

    pub fn ensure_species_dir(&self, species: &SpeciesName) -> Result<Utf8PathBuf, HarvestError> {
        let dir = self.species_dir(species);
        fs::create_dir_all(dir.as_std_path())
            .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
        Ok(dir)
    }

    pub fn metadata_path(&self) -> Utf8PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn compressed_path(
        &self,
        species: &SpeciesName,
        recording: &Recording,
        grade: QualityGrade,
    ) -> Utf8PathBuf {
        self.species_dir(species)
            .join(format!("{}.mp3", clip_stem(recording, grade)))
    }

    pub fn clip_path(
        &self,
        species: &SpeciesName,
        recording: &Recording,
        grade: QualityGrade,
    ) -> Utf8PathBuf {
        self.species_dir(species)
            .join(format!("{}.wav", clip_stem(recording, grade)))
    }
}

/// `<id>_<common name>_<country>_<grade>`, components sanitized for use as
/// a file name.
pub fn clip_stem(recording: &Recording, grade: QualityGrade) -> String {
    format!(
        "{}_{}_{}_{grade}",
        sanitize_component(&recording.id),
        sanitize_component(&recording.common_name),
        sanitize_component(&recording.country),
    )
}

fn sanitize_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' => '_',
            '/' | '\\' | ':' => '-',
            other => other,
        })
        .collect()
}
