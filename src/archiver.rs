//! Orchestration core: works out what is new, fetches it in ascending order
//! and advances the durable progress marker.
//!
//! The marker is advanced after each successfully archived comic, and never
//! past a comic that failed, so a crashed or interrupted run resumes exactly
//! where coverage is still gap-free.

use crate::archive::{self, ArchiveIndex};
use crate::error::Result;
use crate::fetch::{BinaryDownloader, PageFetcher};
use crate::models::ComicRecord;
use crate::page;
use crate::store::Store;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Re-walk the whole archive from comic 1, reusing records that already
    /// exist instead of re-downloading them.
    pub restart: bool,
    /// Pause between successive network rounds. Politeness, not correctness.
    pub delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            restart: false,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Outcome of one run, for logging and the exit path.
#[derive(Debug, Default)]
pub struct RunReport {
    pub latest: u32,
    pub baseline: u32,
    /// Comics fetched, downloaded and recorded this run.
    pub archived: usize,
    /// Comics covered without network work (restart mode, record existed).
    pub reused: usize,
    /// Comics skipped on transient failure, left for the next run.
    pub skipped: usize,
    /// Marker after the run.
    pub progress: u32,
    pub interrupted: bool,
}

pub struct ComicArchiver<'a> {
    fetcher: &'a dyn PageFetcher,
    downloader: &'a dyn BinaryDownloader,
    store: &'a Store,
    base_dir: PathBuf,
    options: SyncOptions,
    stop: Arc<AtomicBool>,
}

impl<'a> ComicArchiver<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        downloader: &'a dyn BinaryDownloader,
        store: &'a Store,
        base_dir: PathBuf,
        options: SyncOptions,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fetcher,
            downloader,
            store,
            base_dir,
            options,
            stop,
        }
    }

    pub fn run(&self) -> Result<RunReport> {
        let index = archive::resolve(self.fetcher)?;
        let latest = index.latest();

        let baseline = if self.options.restart {
            log::info!("Restart requested; walking the archive from comic 1");
            0
        } else {
            self.store.progress()? as u32
        };

        let mut report = RunReport {
            latest,
            baseline,
            progress: self.store.progress()? as u32,
            ..RunReport::default()
        };

        if latest == baseline {
            log::info!("Already have the latest (comic {})", latest);
            self.store.touch_last_run()?;
            return Ok(report);
        }

        // Once a comic fails the marker must not move past it, even if later
        // comics succeed; those are still archived and reused next run.
        let mut gap = false;

        for id in baseline + 1..=latest {
            if self.stop.load(Ordering::SeqCst) {
                log::warn!("Interrupted; stopping before comic {}", id);
                report.interrupted = true;
                break;
            }

            let reused = self.options.restart && self.store.comic_exists(id as i32)?;
            if reused {
                log::debug!("Comic {} already stored, skipping fetch", id);
                report.reused += 1;
            } else {
                match self.archive_one(id, &index) {
                    Ok(()) => report.archived += 1,
                    Err(e) if e.is_transient() => {
                        log::warn!("Skipping comic {}: {}", id, e);
                        report.skipped += 1;
                        gap = true;
                    }
                    Err(e) => return Err(e),
                }
            }

            if !gap {
                self.store.advance(id as i32)?;
                report.progress = id;
            }

            if !reused && id != latest {
                thread::sleep(self.options.delay);
            }
        }

        log::info!(
            "Run complete: {} archived, {} reused, {} skipped, progress at {}",
            report.archived,
            report.reused,
            report.skipped,
            report.progress
        );
        Ok(report)
    }

    fn archive_one(&self, id: u32, index: &ArchiveIndex) -> Result<()> {
        log::info!("Getting comic {}", id);
        let doc = self.fetcher.fetch_document(&page::comic_url(id))?;
        let parsed = page::parse_comic_page(&doc)?;

        let rel_path = page::image_rel_path(id, &parsed.image);
        self.downloader
            .download(parsed.image.as_str(), &self.base_dir.join(&rel_path))?;

        self.store.upsert_comic(&ComicRecord {
            comic_id: id as i32,
            title: index.title(id).map(str::to_string),
            news: parsed.news,
            file_path: rel_path.to_string_lossy().into_owned(),
            collected_at: chrono::Local::now().naive_local(),
        })
    }
}
