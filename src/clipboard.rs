// SPDX-License-Identifier: GPL-3.0-only

//! Clipboard access with a permission gate
//!
//! Mirrors the platform clipboard permission model: query first, write
//! only when the answer is `Granted` or `Prompt`, and swallow every
//! failure. A denied or failing clipboard never disturbs the scan
//! flow; it only leaves a log line.

use crate::errors::ClipboardError;
use tracing::debug;

/// Permission states for clipboard writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardPermission {
    /// Writes are allowed
    Granted,
    /// The platform will ask the user on the first write
    Prompt,
    /// Writes are refused
    Denied,
}

/// Clipboard write capability
pub trait ClipboardWriter: Send + Sync {
    /// Current permission state for writes
    fn query_permission(&self) -> ClipboardPermission;

    /// Write text to the clipboard
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Best-effort copy honoring the permission model.
///
/// Returns whether a write was attempted; errors are logged and
/// swallowed either way.
pub fn copy_text(writer: &dyn ClipboardWriter, text: &str) -> bool {
    match writer.query_permission() {
        ClipboardPermission::Granted | ClipboardPermission::Prompt => {
            if let Err(e) = writer.write_text(text) {
                debug!(error = %e, "Error copying to clipboard");
            }
            true
        }
        ClipboardPermission::Denied => {
            debug!("Clipboard write denied, skipping copy");
            false
        }
    }
}

/// System clipboard backed by arboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn query_permission(&self) -> ClipboardPermission {
        // arboard has no prompt stage: either a clipboard is reachable
        // or it is not.
        match arboard::Clipboard::new() {
            Ok(_) => ClipboardPermission::Granted,
            Err(_) => ClipboardPermission::Denied,
        }
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingClipboard {
        permission: ClipboardPermission,
        writes: Mutex<Vec<String>>,
    }

    impl ClipboardWriter for RecordingClipboard {
        fn query_permission(&self) -> ClipboardPermission {
            self.permission
        }

        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_write_on_granted() {
        let clipboard = RecordingClipboard {
            permission: ClipboardPermission::Granted,
            writes: Mutex::new(Vec::new()),
        };
        assert!(copy_text(&clipboard, "HELLO"));
        assert_eq!(clipboard.writes.lock().unwrap().as_slice(), ["HELLO"]);
    }

    #[test]
    fn test_write_on_prompt() {
        let clipboard = RecordingClipboard {
            permission: ClipboardPermission::Prompt,
            writes: Mutex::new(Vec::new()),
        };
        assert!(copy_text(&clipboard, "x"));
        assert_eq!(clipboard.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_denied_is_silent_noop() {
        let clipboard = RecordingClipboard {
            permission: ClipboardPermission::Denied,
            writes: Mutex::new(Vec::new()),
        };
        assert!(!copy_text(&clipboard, "x"));
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }
}
