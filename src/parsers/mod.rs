pub mod details;
pub mod document;
pub mod json_repair;
pub mod price;

pub use details::*;
pub use document::*;
pub use json_repair::*;
pub use price::*;

use scraper::ElementRef;

/// Collect an element's text nodes, each trimmed, dropping empty ones and
/// joining the rest with `separator`.
pub fn stripped_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
