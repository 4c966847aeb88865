//! Image I/O operations service
//!
//! This module separates file I/O operations from business logic,
//! making the system more testable and maintainable.

use crate::{
    config::OutputFormat,
    error::{BgCarveError, Result},
};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first and falls back to
    /// content-based detection when the extension lies.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when the file is missing or undecodable.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgCarveError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                debug!(
                    path = %path_ref.display(),
                    error = %e,
                    "extension-based loading failed, attempting content-based detection"
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    BgCarveError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    let extension = path_ref
                        .extension()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown");

                    BgCarveError::processing_stage_error(
                        "image loading",
                        &format!(
                            "Failed to load image with both extension-based ({}) and content-based detection. Extension error: {}. Content error: {}",
                            extension, e, content_err
                        ),
                        Some(&format!(
                            "path: {}, size: {} bytes",
                            path_ref.display(),
                            data.len()
                        )),
                    )
                })
            },
        }
    }

    /// Save an image to a file with the specified format
    ///
    /// Creates the parent directory when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when the directory cannot be created or
    /// encoding fails.
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BgCarveError::file_io_error("create output directory", parent, &e)
            })?;
        }

        let result = match format {
            OutputFormat::Png => image.save_with_format(path_ref, image::ImageFormat::Png),
            OutputFormat::Jpeg => image.save_with_format(path_ref, image::ImageFormat::Jpeg),
            OutputFormat::WebP => image.save_with_format(path_ref, image::ImageFormat::WebP),
            OutputFormat::Rgba8 => {
                let rgba8 = image.to_rgba8();
                std::fs::write(path_ref, rgba8.as_raw())
                    .map_err(|e| BgCarveError::file_io_error("write RGBA8 data", path_ref, &e))?;
                return Ok(());
            },
        };

        result.map_err(|e| {
            BgCarveError::processing_stage_error(
                "image save",
                &format!("Failed to save as {}: {}", format, e),
                Some(&format!("format: {}, path: {}", format, path_ref.display())),
            )
        })
    }

    /// Check if a file path has a supported image extension
    #[must_use]
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "bmp"
                )
            })
    }

    /// Load an image from bytes
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when the bytes cannot be decoded.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| {
            BgCarveError::processing(format!("Failed to decode image from bytes: {}", e))
        })
    }

    /// Load an image from an async reader
    ///
    /// Reads the full stream into memory and decodes it; suitable for
    /// network streams or large files behind any `AsyncRead`.
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when reading or decoding fails.
    pub async fn load_from_reader<R: tokio::io::AsyncRead + Unpin>(
        mut reader: R,
    ) -> Result<DynamicImage> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        AsyncReadExt::read_to_end(&mut reader, &mut buffer)
            .await
            .map_err(|e| BgCarveError::processing(format!("Failed to read from stream: {}", e)))?;

        Self::load_from_bytes(&buffer)
    }

    /// Save an image to an async writer, returning the bytes written
    ///
    /// # Errors
    ///
    /// Returns `BgCarveError` when encoding or writing fails.
    pub async fn save_to_writer<W: tokio::io::AsyncWrite + Unpin>(
        image: &DynamicImage,
        mut writer: W,
        format: OutputFormat,
        quality: u8,
    ) -> Result<u64> {
        use tokio::io::AsyncWriteExt;

        let bytes = match format {
            OutputFormat::Png => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                image
                    .write_to(&mut cursor, image::ImageFormat::Png)
                    .map_err(|e| {
                        BgCarveError::processing(format!("Failed to encode PNG: {}", e))
                    })?;
                buffer
            },
            OutputFormat::Jpeg => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                let rgb_image = image.to_rgb8();
                let mut jpeg_encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
                jpeg_encoder.encode_image(&rgb_image).map_err(|e| {
                    BgCarveError::processing(format!("Failed to encode JPEG: {}", e))
                })?;
                buffer
            },
            OutputFormat::WebP => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                image
                    .write_to(&mut cursor, image::ImageFormat::WebP)
                    .map_err(|e| {
                        BgCarveError::processing(format!("Failed to encode WebP: {}", e))
                    })?;
                buffer
            },
            OutputFormat::Rgba8 => image.to_rgba8().into_raw(),
        };

        AsyncWriteExt::write_all(&mut writer, &bytes)
            .await
            .map_err(|e| BgCarveError::processing(format!("Failed to write to stream: {}", e)))?;
        AsyncWriteExt::flush(&mut writer)
            .await
            .map_err(|e| BgCarveError::processing(format!("Failed to flush stream: {}", e)))?;

        Ok(bytes.len() as u64)
    }
}
