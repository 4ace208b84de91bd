//! PDF archiver for saved stories
//!
//! For every story this module renders two PDFs into a per-story directory:
//! the linked article and the site's discussion thread. Existing files are
//! never re-rendered, and a failing render is logged and skipped so one bad
//! URL cannot stop the batch.
//!
//! Layout: `<root>/<name>/<name>.pdf` and `<root>/<name>/comments_<name>.pdf`,
//! plus an owner marker naming the item id.

mod naming;
mod renderer;

pub use naming::{claim_folder, read_owner, sanitize_title, NameAllocator, OWNER_MARKER};
pub use renderer::{PdfRenderer, RenderError, WkhtmltopdfRenderer};

use crate::config::PdfConfig;
use crate::item::Item;
use crate::HarvestError;
use std::path::{Path, PathBuf};
use url::Url;

/// Settings for one archiving pass
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Root directory for story folders
    pub output_folder: PathBuf,

    /// Site root, used to build discussion thread URLs
    pub site_base: Url,

    /// Article PDFs at or below this size are reported as likely empty
    pub min_size_bytes: u64,

    pub max_name_length: usize,
}

impl ArchiveOptions {
    pub fn new(output_folder: PathBuf, site_base: Url, pdf: &PdfConfig) -> Self {
        Self {
            output_folder,
            site_base,
            min_size_bytes: pdf.min_size_bytes,
            max_name_length: pdf.max_name_length,
        }
    }
}

/// Counts from one archiving pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub rendered: usize,
    /// Targets already present on disk
    pub skipped: usize,
    pub failed: usize,
    /// Article PDFs at or below the size threshold
    pub suspicious: usize,
    /// Stories without a URL; only their discussion is archived
    pub without_url: usize,
}

/// What happened to one render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetOutcome {
    Rendered,
    Skipped,
    Failed,
}

/// Renders every story's article and discussion thread to PDF
///
/// Only directory creation errors abort the pass. Render failures are
/// logged as `Could not load url <url>` and counted.
pub fn archive_stories(
    stories: &[Item],
    options: &ArchiveOptions,
    renderer: &dyn PdfRenderer,
) -> Result<ArchiveReport, HarvestError> {
    std::fs::create_dir_all(&options.output_folder)?;

    let mut report = ArchiveReport::default();
    let mut names = NameAllocator::new(&options.output_folder, options.max_name_length);
    let total = stories.len();

    for (position, story) in stories.iter().enumerate() {
        let name = names.allocate(story);
        tracing::info!("Processing {} ({} of {})", name, position + 1, total);

        let folder = options.output_folder.join(&name);
        std::fs::create_dir_all(&folder)?;
        claim_folder(&folder, story)?;

        // Article
        let article_path = folder.join(format!("{}.pdf", name));
        match story.url.as_deref() {
            Some(url) => {
                let outcome = render_target(renderer, url, &article_path);
                record(&mut report, outcome);
            }
            None => {
                tracing::debug!("Story {} has no URL, archiving discussion only", story.id);
                report.without_url += 1;
            }
        }

        // Discussion thread
        match story.discussion_url(&options.site_base) {
            Ok(url) => {
                let comments_path = folder.join(format!("comments_{}.pdf", name));
                let outcome = render_target(renderer, url.as_str(), &comments_path);
                record(&mut report, outcome);
            }
            Err(e) => {
                tracing::warn!("No discussion URL for item {}: {}", story.id, e);
                report.failed += 1;
            }
        }

        if is_suspiciously_small(&article_path, options.min_size_bytes) {
            tracing::warn!(
                "Empty file for {}: {} is at most {} bytes",
                story.url.as_deref().unwrap_or_default(),
                article_path.display(),
                options.min_size_bytes
            );
            report.suspicious += 1;
        }
    }

    tracing::info!(
        "PDF export finished: {} rendered, {} skipped, {} failed, {} suspicious",
        report.rendered,
        report.skipped,
        report.failed,
        report.suspicious
    );
    Ok(report)
}

fn render_target(renderer: &dyn PdfRenderer, url: &str, dest: &Path) -> TargetOutcome {
    if dest.exists() {
        tracing::debug!("{} already exists, skipping", dest.display());
        return TargetOutcome::Skipped;
    }

    match renderer.render(url, dest) {
        Ok(()) => TargetOutcome::Rendered,
        Err(e) => {
            tracing::warn!("Could not load url {}: {}", url, e);
            TargetOutcome::Failed
        }
    }
}

fn record(report: &mut ArchiveReport, outcome: TargetOutcome) {
    match outcome {
        TargetOutcome::Rendered => report.rendered += 1,
        TargetOutcome::Skipped => report.skipped += 1,
        TargetOutcome::Failed => report.failed += 1,
    }
}

/// A present article PDF at or below `threshold` bytes
fn is_suspiciously_small(path: &Path, threshold: u64) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.len() <= threshold)
        .unwrap_or(false)
}
