//! Control UI assets for the live-reload control panel.
//!
//! Provides a single API for accessing UI assets in both embedded and
//! filesystem modes:
//!
//! - **`embed` feature on**: Assets are compiled into the binary via `rust-embed`
//! - **`embed` feature off**: Assets are read from `ui/` at runtime
//!
//! The injectable browser script ([`CLIENT_SCRIPT`]) is always compiled in,
//! since the host reads it once when the plugin is loaded.

use std::borrow::Cow;
#[cfg(not(feature = "embed"))]
use std::path::Path;

/// Embedded UI assets (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "../../ui"]
#[prefix = ""]
struct Assets;

/// Directory for filesystem-based asset serving (dev mode).
#[cfg(not(feature = "embed"))]
const DEV_DIR: &str = "ui";

/// Script injected into every browser page served by the host.
///
/// Announces the visited path to the control panel on connect.
pub const CLIENT_SCRIPT: &[u8] = include_bytes!("../../../ui/js/includes/events.js");

/// Get a UI asset by path (relative to `ui/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(feature = "embed")]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get a UI asset by path (relative to `ui/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
/// Paths escaping the asset root are rejected.
#[cfg(not(feature = "embed"))]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    let full_path = Path::new(DEV_DIR).join(path);
    std::fs::read(&full_path).ok().map(Cow::Owned)
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
