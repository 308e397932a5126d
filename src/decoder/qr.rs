// SPDX-License-Identifier: GPL-3.0-only

//! QR decoder capability backed by rqrr
//!
//! Converts the sampled RGBA buffer to grayscale and runs rqrr's
//! detector over it. The first decodable symbol wins; frames with no
//! symbol are the normal case and map to [`DecodeError::NoSymbol`].

use super::SymbolDecoder;
use crate::channel::SampleTask;
use crate::errors::DecodeError;
use image::DynamicImage;
use tracing::trace;

/// rqrr-backed QR decoder
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    fn decode(&self, task: &SampleTask) -> Result<String, DecodeError> {
        let expected = task.width as usize * task.height as usize * 4;
        if task.pixels.len() != expected {
            return Err(DecodeError::BadFrame(format!(
                "{} bytes for {}x{} RGBA",
                task.pixels.len(),
                task.width,
                task.height
            )));
        }

        let rgba = image::RgbaImage::from_raw(task.width, task.height, task.pixels.to_vec())
            .ok_or_else(|| DecodeError::BadFrame("buffer/dimension mismatch".into()))?;
        let gray = DynamicImage::ImageRgba8(rgba).into_luma8();

        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(DecodeError::NoSymbol);
        }

        trace!(count = grids.len(), "QR grids detected");

        // Several symbols in one frame is possible; take the first one
        // that actually decodes.
        let mut last_error = None;
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(content),
                Err(e) => last_error = Some(e),
            }
        }

        Err(DecodeError::MalformedSymbol(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "undecodable symbol".into()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn task(width: u32, height: u32, pixels: Vec<u8>) -> SampleTask {
        SampleTask {
            request_id: 1,
            width,
            height,
            pixels: Arc::from(pixels.as_slice()),
        }
    }

    #[test]
    fn test_blank_frame_has_no_symbol() {
        let decoder = QrDecoder::new();
        let blank = task(32, 32, vec![255u8; 32 * 32 * 4]);
        assert!(matches!(
            decoder.decode(&blank),
            Err(DecodeError::NoSymbol) | Err(DecodeError::MalformedSymbol(_))
        ));
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        let decoder = QrDecoder::new();
        let bad = task(32, 32, vec![0u8; 16]);
        assert!(matches!(decoder.decode(&bad), Err(DecodeError::BadFrame(_))));
    }
}
