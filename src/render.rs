//! File-level rendering: decode, filter, encode.
//!
//! [`render_file`] backs the `apply` command. [`render_previews`] backs
//! `preview`: it renders every filter of a catalog against one decoded image,
//! in parallel on the global rayon pool. Results come back in catalog order
//! whatever order the workers finish in, and one failing filter does not stop
//! the others.
//!
//! Preview files are named `<stem>-<NNN>-<filter id>.<ext>`, with a 1-based
//! catalog position:
//!
//! ```text
//! out/
//! ├── harbour-001-none.png
//! ├── harbour-002-sepia.png
//! ├── harbour-003-invert.png
//! ├── harbour-004-vignette.png
//! └── harbour-005-zoom-blur.png
//! ```

use crate::catalog::FilterCatalog;
use crate::config::OutputConfig;
use crate::filters::{ApplyError, FilterKind};
use crate::imaging::{DecodeError, EncodeError, FilterBackend, PixelImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read input: {0}")]
    Decode(#[from] DecodeError),
    #[error("Failed to write output: {0}")]
    Encode(#[from] EncodeError),
    #[error("{filter} produced no image: {source}")]
    Filter {
        filter: String,
        #[source]
        source: ApplyError,
    },
}

/// A filtered image written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub filter: FilterKind,
    pub path: PathBuf,
    pub size: (u32, u32),
}

/// Outcome for one catalog entry of a preview run.
#[derive(Debug)]
pub struct PreviewResult {
    /// 1-based catalog position.
    pub index: usize,
    pub filter: FilterKind,
    pub outcome: Result<Rendered, RenderError>,
}

/// Apply `filter` to an already decoded image and write it to `output`.
pub fn render_image(
    backend: &impl FilterBackend,
    filter: &FilterKind,
    image: &PixelImage,
    output: &Path,
    config: &OutputConfig,
) -> Result<Rendered, RenderError> {
    let filtered = filter
        .try_apply_with(backend, image)
        .map_err(|source| RenderError::Filter {
            filter: filter.id(),
            source,
        })?;
    filtered.save(output, config.format, config.quality)?;
    debug!(filter = %filter, path = %output.display(), "rendered");
    Ok(Rendered {
        filter: *filter,
        path: output.to_path_buf(),
        size: filtered.size(),
    })
}

/// Decode `input`, apply `filter` and write the result to `output`.
pub fn render_file(
    backend: &impl FilterBackend,
    filter: &FilterKind,
    input: &Path,
    output: &Path,
    config: &OutputConfig,
) -> Result<Rendered, RenderError> {
    let image = PixelImage::open(input)?;
    render_image(backend, filter, &image, output, config)
}

/// File name for the catalog entry at 1-based `index`.
pub fn preview_file_name(stem: &str, index: usize, filter: &FilterKind, config: &OutputConfig) -> String {
    format!(
        "{stem}-{index:0>3}-{}.{}",
        filter.id(),
        config.format.extension()
    )
}

/// Render every filter in `catalog` into `out_dir`.
///
/// Only directory creation can fail the whole run; per-filter failures are
/// reported in their [`PreviewResult`].
pub fn render_previews(
    backend: &impl FilterBackend,
    catalog: &FilterCatalog,
    image: &PixelImage,
    stem: &str,
    out_dir: &Path,
    config: &OutputConfig,
) -> Result<Vec<PreviewResult>, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    info!(filters = catalog.len(), dir = %out_dir.display(), "rendering previews");

    let results = catalog
        .filters()
        .par_iter()
        .enumerate()
        .map(|(i, filter)| {
            let index = i + 1;
            let path = out_dir.join(preview_file_name(stem, index, filter, config));
            PreviewResult {
                index,
                filter: *filter,
                outcome: render_image(backend, filter, image, &path, config),
            }
        })
        .collect();
    Ok(results)
}
