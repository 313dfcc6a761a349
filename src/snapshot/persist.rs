//! Re-encode a snapshot and write it to disk
//!
//! `.png` targets get a lossless PNG, `.jpeg` targets a JPEG at the encoder's
//! default quality. The file handle is dropped on every path out of [`save`];
//! a half-written file is removed when encoding fails.

use super::fetch::DecodedImage;
use super::{Result, SnapshotError};
use crate::config::{OutputFormat, OutputTarget};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Encode `image` into `target.path` using `target.format`.
pub fn save(image: DecodedImage, target: &OutputTarget) -> Result<()> {
    info!("saving image to {}", target.path.display());

    let file = File::create(&target.path).map_err(|source| SnapshotError::Create {
        path: target.path.clone(),
        source,
    })?;
    write_to(&image, target, BufWriter::new(file))
}

/// Encode into an already opened destination, flush it and release it.
///
/// On failure the writer is dropped before `target.path` is removed.
fn write_to<W: Write>(image: &DynamicImage, target: &OutputTarget, mut writer: W) -> Result<()> {
    let result = encode(image, target.format, &mut writer).and_then(|()| {
        writer.flush().map_err(|source| SnapshotError::Write {
            path: target.path.clone(),
            source,
        })
    });
    drop(writer);

    if let Err(ref e) = result {
        warn!(error = %e, "removing partially written output");
        remove_partial(&target.path);
    } else {
        debug!(format = target.format.extension(), "image written");
    }
    result
}

/// Derive the target from the path suffix, then [`save`].
pub fn save_to_path(image: DecodedImage, path: impl Into<PathBuf>) -> Result<()> {
    let target = OutputTarget::from_path(path)?;
    save(image, &target)
}

fn encode<W: Write>(image: &DynamicImage, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Png => image
            .write_with_encoder(PngEncoder::new(writer))
            .map_err(SnapshotError::Encode),
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let converted;
            let image = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                other => {
                    converted = DynamicImage::ImageRgb8(other.to_rgb8());
                    &converted
                }
            };
            image
                .write_with_encoder(JpegEncoder::new(writer))
                .map_err(SnapshotError::Encode)
        }
    }
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "could not remove partial output");
    }
}
