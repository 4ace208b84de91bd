//! Harvest coordinator - one run from login to PDF export
//!
//! Phases run strictly in order, each to completion:
//! 1. Log in
//! 2. Resolve the page range
//! 3. Load the cache snapshot (once)
//! 4. Scrape and merge stories, then comments
//! 5. Write the output document
//! 6. Archive stories to PDF

use crate::archive::{archive_stories, ArchiveOptions, ArchiveReport, PdfRenderer, WkhtmltopdfRenderer};
use crate::cache::{load_snapshot, merge_items, save_document, CacheIndex, MergeStats, OutputDocument};
use crate::config::RunConfig;
use crate::item::ItemFetcher;
use crate::listing::{resolve_page_range, scrape_listing, ListingKind, PageRange};
use crate::session::Session;
use crate::HarvestError;
use std::path::PathBuf;

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of listing pages scraped per collection
    pub pages: u32,

    pub stories: MergeStats,
    pub comments: MergeStats,

    /// The document as written (or as it would have been, without `--file`)
    pub document: OutputDocument,

    pub written_to: Option<PathBuf>,

    /// Present when PDF export ran
    pub archive: Option<ArchiveReport>,
}

/// Drives a single harvest run
pub struct Harvester {
    config: RunConfig,
    renderer: Box<dyn PdfRenderer>,
}

impl Harvester {
    /// Creates a harvester that renders with the configured external renderer
    pub fn new(config: RunConfig) -> Self {
        let renderer = WkhtmltopdfRenderer::from_config(&config.settings.pdf);
        Self::with_renderer(config, Box::new(renderer))
    }

    /// Creates a harvester with a specific PDF backend
    pub fn with_renderer(config: RunConfig, renderer: Box<dyn PdfRenderer>) -> Self {
        Self { config, renderer }
    }

    /// Runs every phase and returns the summary
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run finished; individual item or render
    ///   failures are reflected in the summary counts
    /// * `Err(HarvestError)` - Login failed, a listing page could not be
    ///   read, or the cache/output file could not be read or written
    pub async fn run(&self) -> Result<RunSummary, HarvestError> {
        let config = &self.config;
        let settings = &config.settings;
        let username = config.credentials.username.as_str();

        // Log in; everything after needs the session cookie
        let session = Session::login(&settings.site, &config.credentials).await?;

        // Determine which listing pages to walk
        let range = resolve_page_range(
            &session,
            username,
            config.pages,
            settings.site.max_discovery_pages,
        )
        .await?;
        tracing::info!("Pages to scrape: {}", range.len());

        // Load the previous document before it gets overwritten
        let cache = self.load_cache()?;
        let fetcher = ItemFetcher::new(&settings.api)?;
        let mut document = OutputDocument::new();

        let mut stories = MergeStats::default();
        if config.selection.includes_stories() {
            tracing::info!("Getting stories as JSON");
            stories = self
                .harvest_kind(&session, &range, ListingKind::Stories, cache.as_ref(), &fetcher, &mut document)
                .await?;
        }

        let mut comments = MergeStats::default();
        if config.selection.includes_comments() {
            tracing::info!("Getting comments as JSON");
            let comment_cache = cache.as_ref().filter(|_| settings.cache.cache_comments);
            comments = self
                .harvest_kind(&session, &range, ListingKind::Comments, comment_cache, &fetcher, &mut document)
                .await?;
        }

        // Write the document once, after both collections are complete
        let written_to = match &config.output_file {
            Some(path) => {
                save_document(path, &document)?;
                tracing::info!(
                    "Wrote {} stories and {} comments to {}",
                    document.saved_stories.len(),
                    document.saved_comments.len(),
                    path.display()
                );
                Some(path.clone())
            }
            None => {
                tracing::info!("No output file given, results not persisted");
                None
            }
        };

        // Render stories to PDF
        let archive = if config.pdf {
            tracing::info!("Exporting to PDF");
            let options = ArchiveOptions::new(
                config.output_folder.clone(),
                session.base().clone(),
                &settings.pdf,
            );
            Some(archive_stories(
                &document.saved_stories,
                &options,
                &*self.renderer,
            )?)
        } else {
            None
        };

        Ok(RunSummary {
            pages: range.len(),
            stories,
            comments,
            document,
            written_to,
            archive,
        })
    }

    /// Reads the previous output document once, if there is one
    fn load_cache(&self) -> Result<Option<CacheIndex>, HarvestError> {
        let Some(path) = &self.config.output_file else {
            return Ok(None);
        };

        match load_snapshot(path)? {
            Some(snapshot) => {
                let index = CacheIndex::from_document(snapshot);
                tracing::info!(
                    "Loaded cache from {}: {} stories, {} comments",
                    path.display(),
                    index.len(ListingKind::Stories),
                    index.len(ListingKind::Comments)
                );
                Ok(Some(index))
            }
            None => {
                tracing::debug!("No previous document at {}", path.display());
                Ok(None)
            }
        }
    }

    async fn harvest_kind(
        &self,
        session: &Session,
        range: &PageRange,
        kind: ListingKind,
        cache: Option<&CacheIndex>,
        fetcher: &ItemFetcher,
        document: &mut OutputDocument,
    ) -> Result<MergeStats, HarvestError> {
        let ids = scrape_listing(session, session.username(), kind, range).await?;
        let (items, stats) = merge_items(&ids, kind, cache, fetcher).await;

        tracing::info!(
            "{}: {} reused from cache, {} fetched ({} unavailable), {} repeated ids dropped",
            kind.label(),
            stats.reused,
            stats.fetched,
            stats.placeholders,
            stats.duplicates
        );

        document.collection_mut(kind).extend(items);
        Ok(stats)
    }
}

/// Runs a complete harvest with the default renderer
pub async fn run_harvest(config: RunConfig) -> Result<RunSummary, HarvestError> {
    Harvester::new(config).run().await
}
