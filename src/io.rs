// ============================================================================
// IO — PNG codec boundary, file-type gate and export writer
// ============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageFormat};

use crate::canvas::RasterBuffer;
use crate::error::RemapError;

/// The only accepted input type.
pub const ACCEPTED_MIME: &str = "image/png";
pub const ACCEPTED_EXTENSION: &str = "png";

/// Reject anything that does not claim to be a PNG. Content problems are
/// reported later by the decoder as `DecodeFailed`.
pub fn check_file_type(path: &Path) -> Result<(), RemapError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext == ACCEPTED_EXTENSION {
        Ok(())
    } else {
        Err(RemapError::InputRejected(format!(
            "'{}' is not a {} file",
            path.display(),
            ACCEPTED_MIME
        )))
    }
}

/// Decode compressed PNG bytes into an RGBA8 buffer (any PNG colour type is
/// expanded to RGBA8).
pub fn decode_png(bytes: &[u8]) -> Result<RasterBuffer, RemapError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| RemapError::DecodeFailed(e.to_string()))?;
    Ok(RasterBuffer::from_rgba_image(img.to_rgba8()))
}

/// Lossless PNG encode of an RGBA8 buffer.
pub fn encode_png(buffer: &RasterBuffer) -> Result<Vec<u8>, RemapError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(buffer.as_raw(), buffer.width(), buffer.height(), ColorType::Rgba8)
        .map_err(|e| RemapError::EncodeFailed(e.to_string()))?;
    Ok(out)
}

/// Gate, read and decode in one step. Safe to call from a worker thread.
pub fn load_png_file(path: &Path) -> Result<RasterBuffer, RemapError> {
    check_file_type(path)?;
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}

/// Encode and write a buffer as PNG.
pub fn write_png_file(buffer: &RasterBuffer, path: &Path) -> Result<(), RemapError> {
    let bytes = encode_png(buffer)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// ============================================================================
// FILE HANDLER — native dialogs for the two upload slots and the export
// ============================================================================

pub struct FileHandler {
    /// Directory of the last picked or written file; dialogs start there.
    pub last_dir: Option<PathBuf>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self { last_dir: None }
    }

    fn remember_dir(&mut self, path: &Path) {
        self.last_dir = path.parent().map(Path::to_path_buf);
    }

    /// Ask for a PNG to upload. The filter is advisory; callers still run
    /// [`check_file_type`] on the result.
    pub fn pick_png(&mut self, title: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title(title)
            .add_filter("PNG Image", &[ACCEPTED_EXTENSION])
            .add_filter("All Files", &["*"]);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        let path = dialog.pick_file()?;
        self.remember_dir(&path);
        Some(path)
    }

    pub fn pick_export_path(&mut self, file_name: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("PNG Image", &[ACCEPTED_EXTENSION]);
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        let path = dialog.save_file()?;
        self.remember_dir(&path);
        Some(path)
    }
}
