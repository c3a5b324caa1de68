use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// Scientific name driving one query scope, e.g. "centropus sinensis".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesName(String);

impl SpeciesName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory-safe form: spaces become underscores.
    pub fn dir_name(&self) -> String {
        self.0.replace(' ', "_")
    }
}

impl fmt::Display for SpeciesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpeciesName {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch == ' ' || ch == '-');
        if !is_valid {
            return Err(HarvestError::InvalidSpeciesName(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Country constraint appended to the search query as `cnt:<region>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region(String);

impl Region {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Region {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() || normalized.contains(char::is_whitespace) {
            return Err(HarvestError::InvalidRegion(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Coarse fidelity rating assigned by xeno-canto, A (best) through E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    E,
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::E => "E",
        };
        write!(f, "{letter}")
    }
}

impl FromStr for QualityGrade {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" | "a" => Ok(QualityGrade::A),
            "B" | "b" => Ok(QualityGrade::B),
            "C" | "c" => Ok(QualityGrade::C),
            "D" | "d" => Ok(QualityGrade::D),
            "E" | "e" => Ok(QualityGrade::E),
            other => Err(HarvestError::InvalidQualityGrade(other.to_string())),
        }
    }
}

/// One search result as returned by `/api/2/recordings`. Transient; lives
/// only while the recording is being processed.
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    pub id: String,
    #[serde(rename = "gen", default)]
    pub genus: String,
    #[serde(rename = "sp", default)]
    pub species_epithet: String,
    #[serde(rename = "en", default)]
    pub common_name: String,
    #[serde(rename = "cnt", default)]
    pub country: String,
    #[serde(rename = "loc", default)]
    pub locality: String,
    #[serde(default)]
    pub length: String,
    #[serde(rename = "q", default)]
    pub quality: String,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "file", default)]
    pub audio_url: String,
}

impl Recording {
    pub fn scientific_name(&self) -> String {
        format!("{} {}", self.genus, self.species_epithet)
    }

    /// The grade letter parsed, or `None` for restricted / unrated records.
    pub fn grade(&self) -> Option<QualityGrade> {
        self.quality.parse().ok()
    }
}

/// One page of search results. An empty page is the normal end-of-pagination
/// signal, not an error.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecordingPage {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

impl RecordingPage {
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }
}
