use std::fs;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ResolvedConfig;
use crate::domain::{Recording, SpeciesName};
use crate::error::HarvestError;
use crate::metadata::{ClipRow, MetadataTable};
use crate::store::OutputStore;
use crate::transcode::Transcoder;
use crate::xeno::XenoCantoClient;

/// Terminal state of one recording. Only `Committed` increments the
/// per-species quota and appends a metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingOutcome {
    Rejected,
    FetchFailed,
    TranscodeFailed,
    Committed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesReport {
    pub species: String,
    pub committed: u32,
    pub rejected: u32,
    pub fetch_failed: u32,
    pub transcode_failed: u32,
    pub pages_scanned: u32,
    /// Set when the scan stopped early on a page-level error; later species
    /// are unaffected.
    pub aborted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub species: Vec<SpeciesReport>,
    pub total_committed: u32,
    pub metadata_path: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct Harvester<C: XenoCantoClient, T: Transcoder> {
    config: ResolvedConfig,
    store: OutputStore,
    client: C,
    transcoder: T,
}

impl<C: XenoCantoClient, T: Transcoder> Harvester<C, T> {
    pub fn new(config: ResolvedConfig, client: C, transcoder: T) -> Self {
        let store = OutputStore::new(config.output_root.clone());
        Self {
            config,
            store,
            client,
            transcoder,
        }
    }

    /// One pass over the configured species list. The metadata table is
    /// written exactly once, after the last species, even when the list is
    /// empty.
    pub fn run(&self, sink: &dyn ProgressSink) -> Result<HarvestReport, HarvestError> {
        self.store.ensure_root()?;

        let mut table = MetadataTable::new();
        let mut reports = Vec::new();
        for species in &self.config.species {
            sink.event(ProgressEvent {
                message: format!("--- {species} ---"),
            });
            reports.push(self.harvest_species(species, &mut table, sink));
        }

        let metadata_path = self.store.metadata_path();
        table.write(&metadata_path)?;
        info!(rows = table.len(), path = %metadata_path, "metadata table written");

        Ok(HarvestReport {
            total_committed: reports.iter().map(|report| report.committed).sum(),
            species: reports,
            metadata_path: metadata_path.to_string(),
        })
    }

    /// Sequential page walk for one species: stops on an empty page or when
    /// the quota of committed recordings is reached, whichever comes first.
    /// A page-level failure aborts this species only.
    fn harvest_species(
        &self,
        species: &SpeciesName,
        table: &mut MetadataTable,
        sink: &dyn ProgressSink,
    ) -> SpeciesReport {
        let mut report = SpeciesReport {
            species: species.to_string(),
            committed: 0,
            rejected: 0,
            fetch_failed: 0,
            transcode_failed: 0,
            pages_scanned: 0,
            aborted: None,
        };

        if let Err(err) = self.store.ensure_species_dir(species) {
            warn!(%species, error = %err, "cannot create species directory");
            report.aborted = Some(err.to_string());
            return report;
        }

        let mut page = 1u32;
        'pages: loop {
            if report.committed >= self.config.quota {
                break;
            }
            let batch = match self.client.search_page(species, &self.config.region, page) {
                Ok(batch) => batch,
                Err(err) => {
                    warn!(%species, page, error = %err, "page query failed, abandoning species");
                    report.aborted = Some(err.to_string());
                    break;
                }
            };
            report.pages_scanned += 1;

            if batch.is_empty() {
                info!(%species, page, "no more recordings");
                break;
            }

            for recording in &batch.recordings {
                match self.process_recording(species, recording, table) {
                    RecordingOutcome::Committed => {
                        report.committed += 1;
                        sink.event(ProgressEvent {
                            message: format!(
                                "downloaded {}/{} for {species}: XC{}",
                                report.committed, self.config.quota, recording.id
                            ),
                        });
                    }
                    RecordingOutcome::Rejected => report.rejected += 1,
                    RecordingOutcome::FetchFailed => report.fetch_failed += 1,
                    RecordingOutcome::TranscodeFailed => report.transcode_failed += 1,
                }
                if report.committed >= self.config.quota {
                    break 'pages;
                }
            }

            page += 1;
        }

        report
    }

    /// Runs one recording through the quality filter, fetch, and transcode
    /// stages. Every failure is terminal for this recording only.
    pub fn process_recording(
        &self,
        species: &SpeciesName,
        recording: &Recording,
        table: &mut MetadataTable,
    ) -> RecordingOutcome {
        let Some(grade) = recording.grade() else {
            return RecordingOutcome::Rejected;
        };
        if !self.config.quality.contains(&grade) {
            return RecordingOutcome::Rejected;
        }

        // Restricted recordings carry an empty file URL; there is nothing
        // to request.
        if recording.audio_url.is_empty() {
            warn!(id = %recording.id, "recording has no audio url, skipping");
            return RecordingOutcome::FetchFailed;
        }

        let compressed = self.store.compressed_path(species, recording, grade);
        let clip = self.store.clip_path(species, recording, grade);

        if let Err(err) = self
            .client
            .download_audio(&recording.audio_url, compressed.as_std_path())
        {
            warn!(id = %recording.id, error = %err, "download failed, skipping");
            let _ = fs::remove_file(compressed.as_std_path());
            return RecordingOutcome::FetchFailed;
        }

        if let Err(err) = self
            .transcoder
            .transcode(compressed.as_std_path(), clip.as_std_path())
        {
            warn!(id = %recording.id, error = %err, "transcode failed, skipping");
            // Intermediates are never kept: drop the compressed artifact and
            // any partial output.
            let _ = fs::remove_file(compressed.as_std_path());
            let _ = fs::remove_file(clip.as_std_path());
            return RecordingOutcome::TranscodeFailed;
        }

        if let Err(err) = fs::remove_file(compressed.as_std_path()) {
            warn!(id = %recording.id, error = %err, "failed to remove compressed intermediate");
        }

        table.push(ClipRow::new(recording, grade, &clip));
        RecordingOutcome::Committed
    }
}
