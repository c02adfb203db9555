//! Render one page file end to end. The `kitstudio` binary is a thin shell over this.

use std::path::Path;

use crate::config::StudioConfig;
use crate::error::StudioResult;
use crate::mount::{MountSummary, Studio};
use crate::page::Page;

pub const EXIT_OK: i32 = 0;
/// At least one mount point failed; the page was still rendered.
pub const EXIT_MOUNT_FAILED: i32 = 1;
/// Config, catalog directory, page or output could not be processed.
pub const EXIT_ERROR: i32 = 2;

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub summary: MountSummary,
}

/// Load the catalog directory if it exists, then mount the page at `page_path`.
pub async fn render_page_file(config: &StudioConfig, page_path: &Path) -> StudioResult<RenderedPage> {
    let studio = Studio::from_config(config);
    if tokio::fs::metadata(&config.catalog_dir).await.is_ok() {
        studio.store().load_dir(&config.catalog_dir).await?;
    } else {
        tracing::debug!(dir = %config.catalog_dir.display(), "no catalog directory, loading on demand");
    }

    let source = tokio::fs::read_to_string(page_path).await?;
    let mut page = Page::parse(&source)?;
    let summary = studio.mount_page(&mut page).await;

    Ok(RenderedPage {
        html: page.to_html(),
        summary,
    })
}

/// Process exit status for a render attempt.
pub fn exit_code(result: &StudioResult<RenderedPage>) -> i32 {
    match result {
        Ok(rendered) if rendered.summary.is_success() => EXIT_OK,
        Ok(_) => EXIT_MOUNT_FAILED,
        Err(_) => EXIT_ERROR,
    }
}
