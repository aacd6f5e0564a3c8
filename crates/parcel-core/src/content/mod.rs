//! Content type inference for package files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Media types the registry recognizes by file extension.
///
/// Anything else is served as [`ContentType::OctetStream`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
pub enum ContentType {
    #[strum(serialize = "text/html; charset=utf-8")]
    Html,
    #[strum(serialize = "text/css; charset=utf-8")]
    Css,
    #[strum(serialize = "text/javascript; charset=utf-8")]
    JavaScript,
    #[strum(serialize = "application/json")]
    Json,
    #[strum(serialize = "text/markdown; charset=utf-8")]
    Markdown,
    #[strum(serialize = "text/plain; charset=utf-8")]
    Text,
    #[strum(serialize = "application/xml")]
    Xml,
    #[strum(serialize = "image/svg+xml")]
    Svg,
    #[strum(serialize = "image/png")]
    Png,
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/gif")]
    Gif,
    #[strum(serialize = "image/webp")]
    Webp,
    #[strum(serialize = "image/x-icon")]
    Icon,
    #[strum(serialize = "font/woff")]
    Woff,
    #[strum(serialize = "font/woff2")]
    Woff2,
    #[strum(serialize = "font/ttf")]
    Ttf,
    #[strum(serialize = "application/wasm")]
    Wasm,
    #[strum(serialize = "application/pdf")]
    Pdf,
    #[default]
    #[strum(serialize = "application/octet-stream")]
    OctetStream,
}

impl ContentType {
    /// Infers the content type from the extension of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Maps a file extension, without the leading dot, to a content type.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" | "mjs" | "cjs" => Self::JavaScript,
            "json" | "map" => Self::Json,
            "md" | "markdown" => Self::Markdown,
            "txt" => Self::Text,
            "xml" => Self::Xml,
            "svg" => Self::Svg,
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            "ico" => Self::Icon,
            "woff" => Self::Woff,
            "woff2" => Self::Woff2,
            "ttf" => Self::Ttf,
            "wasm" => Self::Wasm,
            "pdf" => Self::Pdf,
            _ => Self::OctetStream,
        }
    }

    /// Returns the media type string sent in `Content-Type`.
    #[inline]
    pub fn mime(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_infer_from_path() {
        assert_eq!(ContentType::from_path("dist/index.js"), ContentType::JavaScript);
        assert_eq!(ContentType::from_path("README.MD"), ContentType::Markdown);
        assert_eq!(ContentType::from_path("lib/index.js.map"), ContentType::Json);
        assert_eq!(ContentType::from_path("LICENSE"), ContentType::OctetStream);
        assert_eq!(ContentType::from_path("archive.tar.gz"), ContentType::OctetStream);
    }

    #[test]
    fn test_mime_round_trips_through_parse() -> anyhow::Result<()> {
        for content_type in ContentType::iter() {
            assert_eq!(ContentType::from_str(content_type.mime())?, content_type);
        }
        Ok(())
    }

    #[test]
    fn test_display_matches_mime() {
        assert_eq!(ContentType::Css.to_string(), "text/css; charset=utf-8");
        assert_eq!(ContentType::default().mime(), "application/octet-stream");
    }
}
