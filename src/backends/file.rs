// SPDX-License-Identifier: GPL-3.0-only

//! File-backed camera backend
//!
//! Streams a still frame decoded from an image file, standing in for a
//! live device. Each configured file appears as one device, so the
//! facing-flip device-exclusion heuristic can be exercised without
//! hardware.

use super::{
    ActiveStream, CameraBackend, CameraDevice, StreamConstraints, StreamHandle,
    SupportedConstraints,
};
use crate::capture::source::{StillFrameSource, VideoFrame};
use crate::errors::CameraError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Camera backend that serves frames from image files
pub struct FileCamera {
    sources: Vec<FileDevice>,
}

#[derive(Debug, Clone)]
struct FileDevice {
    id: String,
    label: String,
    path: PathBuf,
}

impl FileCamera {
    /// Build a backend with one pseudo-device per image file.
    ///
    /// Device labels come from the file stem, ids from the position in
    /// the list.
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Self {
        let sources = paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let path = path.as_ref().to_path_buf();
                let label = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("file-{}", index));
                FileDevice {
                    id: index.to_string(),
                    label,
                    path,
                }
            })
            .collect();
        Self { sources }
    }

    fn select(&self, constraints: &StreamConstraints) -> Result<&FileDevice, CameraError> {
        if self.sources.is_empty() {
            return Err(CameraError::NoCameraFound);
        }
        match &constraints.device_id {
            Some(id) => self
                .sources
                .iter()
                .find(|d| d.id == *id)
                .ok_or_else(|| CameraError::AcquisitionFailed(format!("no device {}", id))),
            None => Ok(&self.sources[0]),
        }
    }
}

#[async_trait]
impl CameraBackend for FileCamera {
    fn supported_constraints(&self) -> SupportedConstraints {
        // Files have no facing; flips go through device enumeration
        SupportedConstraints { facing_mode: false }
    }

    async fn enumerate_devices(&self) -> Vec<CameraDevice> {
        self.sources
            .iter()
            .map(|d| CameraDevice {
                id: d.id.clone(),
                label: d.label.clone(),
            })
            .collect()
    }

    async fn open(&self, constraints: &StreamConstraints) -> Result<ActiveStream, CameraError> {
        let device = self.select(constraints)?.clone();
        debug!(label = %device.label, path = %device.path.display(), "Opening file camera");

        // Decode on the blocking pool; image files can be large
        let path = device.path.clone();
        let frame = tokio::task::spawn_blocking(move || load_frame(&path))
            .await
            .map_err(|e| CameraError::AcquisitionFailed(e.to_string()))??;

        info!(
            label = %device.label,
            width = frame.width,
            height = frame.height,
            "File camera stream ready"
        );

        Ok(ActiveStream {
            handle: Box::new(FileStreamHandle {
                label: device.label,
                stopped: false,
            }),
            source: Arc::new(StillFrameSource::new(frame)),
        })
    }
}

fn load_frame(path: &Path) -> Result<VideoFrame, CameraError> {
    let img = image::open(path)
        .map_err(|e| CameraError::AcquisitionFailed(format!("{}: {}", path.display(), e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(VideoFrame::new(width, height, Arc::from(rgba.into_raw())))
}

struct FileStreamHandle {
    label: String,
    stopped: bool,
}

impl StreamHandle for FileStreamHandle {
    fn device_label(&self) -> &str {
        &self.label
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            debug!(label = %self.label, "File camera stream stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_without_devices_fails() {
        let backend = FileCamera::new::<&str>(&[]);
        let err = backend.open(&StreamConstraints::default()).await.unwrap_err();
        assert!(matches!(err, CameraError::NoCameraFound));
    }

    #[tokio::test]
    async fn test_unknown_device_id_fails() {
        let backend = FileCamera::new(&["missing.png"]);
        let err = backend
            .open(&StreamConstraints::device("7".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, CameraError::AcquisitionFailed(_)));
    }

    #[tokio::test]
    async fn test_devices_enumerate_with_labels() {
        let backend = FileCamera::new(&["front.png", "back.png"]);
        let devices = backend.enumerate_devices().await;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].label, "front");
        assert_eq!(devices[1].label, "back");
    }
}
