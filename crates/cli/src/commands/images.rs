//! Offline product image compression.
//!
//! Runs the same pipeline as the vendor product form, so images can be
//! prepared in bulk before upload.
//!
//! ```bash
//! souk-cli images compress photos/*.png --out-dir compressed --max-dimension 1200
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use souk_storefront::services::images::{CompressionOptions, ImageError, compress_all};
use thiserror::Error;

/// Errors that can occur while compressing.
#[derive(Debug, Error)]
pub enum ImagesError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("two inputs would both be written to {0}")]
    DuplicateOutput(PathBuf),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Output path of `input`: same stem, `.jpg`, in `out_dir`.
#[must_use]
pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    out_dir.join(format!("{stem}.jpg"))
}

fn plan(inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>, ImagesError> {
    let mut seen = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let out = output_path(input, out_dir);
            if seen.insert(out.clone()) {
                Ok(out)
            } else {
                Err(ImagesError::DuplicateOutput(out))
            }
        })
        .collect()
}

/// Compress every input into `out_dir`, returning the written paths.
///
/// # Errors
///
/// Returns an error if an input cannot be read or decoded, two inputs map to
/// the same output, or an output cannot be written. Nothing is written when
/// any input fails to compress.
pub async fn compress(
    inputs: &[PathBuf],
    out_dir: &Path,
    options: CompressionOptions,
) -> Result<Vec<PathBuf>, ImagesError> {
    let outputs = plan(inputs, out_dir)?;

    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        let bytes = tokio::fs::read(input).await.map_err(|source| ImagesError::Io {
            path: input.clone(),
            source,
        })?;
        sources.push(bytes);
    }

    let compressed = compress_all(sources, options).await?;

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| ImagesError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

    for ((input, out), image) in inputs.iter().zip(&outputs).zip(compressed) {
        tokio::fs::write(out, &image.bytes)
            .await
            .map_err(|source| ImagesError::Io {
                path: out.clone(),
                source,
            })?;
        tracing::info!(
            input = %input.display(),
            output = %out.display(),
            width = image.width,
            height = image.height,
            bytes = image.bytes.len(),
            "Image compressed"
        );
    }

    Ok(outputs)
}
