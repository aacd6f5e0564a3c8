//! Drop-in replacements for the `axum` extractors whose rejections carry a
//! JSON error body.

mod enhanced_json;
mod enhanced_multipart;
mod enhanced_path;

pub use enhanced_json::Json;
pub use enhanced_multipart::Multipart;
pub use enhanced_path::Path;

/// Keeps rejection details short enough for a log line.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(2).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
