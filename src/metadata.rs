use camino::Utf8Path;
use serde::Serialize;

use crate::domain::{QualityGrade, Recording};
use crate::error::HarvestError;
use crate::xeno;

/// Persisted projection of one committed recording. Field order is the
/// column order of the output table.
#[derive(Debug, Clone, Serialize)]
pub struct ClipRow {
    pub filename: String,
    pub species: String,
    pub scientific_name: String,
    pub location: String,
    pub country: String,
    pub length: String,
    pub quality: QualityGrade,
    pub date: String,
    pub id: String,
    pub url: String,
    pub downloaded_at: String,
}

impl ClipRow {
    pub const HEADER: [&'static str; 11] = [
        "filename",
        "species",
        "scientific_name",
        "location",
        "country",
        "length",
        "quality",
        "date",
        "id",
        "url",
        "downloaded_at",
    ];

    pub fn new(recording: &Recording, grade: QualityGrade, clip_path: &Utf8Path) -> Self {
        Self {
            filename: clip_path.to_string(),
            species: recording.common_name.clone(),
            scientific_name: recording.scientific_name(),
            location: recording.locality.clone(),
            country: recording.country.clone(),
            length: recording.length.clone(),
            quality: grade,
            date: recording.date.clone(),
            id: recording.id.clone(),
            url: xeno::detail_url(&recording.id),
            downloaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only in-memory table, serialized once at the end of the run.
#[derive(Debug, Default)]
pub struct MetadataTable {
    rows: Vec<ClipRow>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ClipRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ClipRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table with a header row and no index column. The header
    /// is emitted even when there are no rows.
    pub fn write(&self, path: &Utf8Path) -> Result<(), HarvestError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path.as_std_path())
            .map_err(|err| HarvestError::Csv(err.to_string()))?;
        writer
            .write_record(ClipRow::HEADER)
            .map_err(|err| HarvestError::Csv(err.to_string()))?;
        for row in &self.rows {
            writer
                .serialize(row)
                .map_err(|err| HarvestError::Csv(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| HarvestError::Csv(err.to_string()))?;
        Ok(())
    }
}
