use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::stripped_text;
use crate::models::{DetailMapping, SimilarItem};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid detail selector")
}

static PRICE_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div.price-container"));
static TABLE_ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| selector("th"));
static DATA_CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

static PRICE_CONTAINER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bclass\s*=\s*["'][^"']*\bprice-container\b[^"']*["'][^>]*>"#)
        .expect("Invalid price container regex")
});
static DIV_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<div\b|</div\s*>").expect("Invalid div tag regex")
});

static COMMENT_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.comment"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

static SIMILAR_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.similar"));
static SIMILAR_ITEM: Lazy<Selector> = Lazy::new(|| selector("li.article-list-item"));
static SIMILAR_PRICE: Lazy<Selector> = Lazy::new(|| selector("div.price1"));

/// Parse the price table, agent comment and comparable listings out of a
/// listing's HTML fragment. Every block is optional.
pub fn parse_html_details(html: &str) -> DetailMapping {
    let mut details = DetailMapping::default();
    if html.is_empty() {
        return details;
    }

    let fragment = Html::parse_fragment(html);

    if let Some(container) = fragment.select(&PRICE_CONTAINER).next() {
        if container.select(&TABLE_ROW).next().is_some() {
            insert_price_rows(&mut details, container);
        } else if let Some(rows) = reparse_loose_rows(html) {
            insert_price_rows(&mut details, rows.root_element());
        }
    }

    if let Some(comment) = fragment.select(&COMMENT_BLOCK).next() {
        if let Some(paragraph) = comment.select(&PARAGRAPH).next() {
            details.comment = Some(stripped_text(paragraph, "\n"));
        }
    }

    let mut similar_items = Vec::new();
    if let Some(section) = fragment.select(&SIMILAR_BLOCK).next() {
        for item in section.select(&SIMILAR_ITEM) {
            if let Some(price) = item.select(&SIMILAR_PRICE).next() {
                similar_items.push(SimilarItem {
                    price: stripped_text(price, ""),
                });
            }
        }
    }
    details.similar_items = Some(similar_items);

    debug!(
        "Parsed {} price rows, comment: {}, {} similar items",
        details.fields().count(),
        details.comment.is_some(),
        details.similar_items().len()
    );

    details
}

fn insert_price_rows(details: &mut DetailMapping, scope: ElementRef<'_>) {
    for row in scope.select(&TABLE_ROW) {
        let header = row.select(&HEADER_CELL).next();
        let data = row.select(&DATA_CELL).next();
        if let (Some(th), Some(td)) = (header, data) {
            details.insert(stripped_text(th, ""), stripped_text(td, ""));
        }
    }
}

/// HTML5 tree building drops `tr`/`th`/`td` that sit outside a `table`.
/// Cut the price container's raw markup out of the source and parse it again
/// inside a `<table>` so rows placed directly in the div survive.
fn reparse_loose_rows(html: &str) -> Option<Html> {
    let open = PRICE_CONTAINER_OPEN.find(html)?;
    let body = &html[open.end()..];

    let mut depth = 1usize;
    let mut end = body.len();
    for tag in DIV_TAG.find_iter(body) {
        if tag.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                end = tag.start();
                break;
            }
        } else {
            depth += 1;
        }
    }

    Some(Html::parse_fragment(&format!("<table>{}</table>", &body[..end])))
}
