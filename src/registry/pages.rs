// src/registry/pages.rs

// --- Imports ---
use crate::registry::models::{DocumentDetailSchema, FilingsTableSchema, SearchResultsSchema};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("Failed to compile TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static HEADER_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th").expect("Failed to compile HEADER_CELL_SELECTOR")
});

static DATA_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile DATA_CELL_SELECTOR")
});

// Header and data cells in document order
static ANY_CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td, th").expect("Failed to compile ANY_CELL_SELECTOR")
});

/// Visible text of an element with whitespace runs (including &nbsp;) collapsed.
fn visible_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalized_text(element: ElementRef) -> String {
    visible_text(element).to_lowercase()
}

fn first_href(element: ElementRef) -> Option<String> {
    element
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Finds the href of the first anchor whose text contains the collection-of-filings label.
pub fn find_collection_link(html: &str, schema: &SearchResultsSchema) -> Option<String> {
    let document = Html::parse_document(html);

    let link = document
        .select(&LINK_SELECTOR)
        .find(|a| visible_text(*a).contains(schema.link_label))?;

    tracing::debug!("Matched search result anchor: '{}'", visible_text(link));
    link.value().attr("href").map(str::to_string)
}

/// Finds the detail-page href of the first filing row of the wanted document type.
///
/// Only tables whose `th` cells include every required header are considered;
/// they are scanned in document order until one yields a matching row.
pub fn find_filing_link(html: &str, schema: &FilingsTableSchema) -> Option<String> {
    let document = Html::parse_document(html);

    for table in document.select(&TABLE_SELECTOR) {
        let headers: Vec<String> =
            table.select(&HEADER_CELL_SELECTOR).map(normalized_text).collect();
        let has_schema = schema
            .required_headers
            .iter()
            .all(|required| headers.iter().any(|h| h == required));
        if !has_schema {
            tracing::trace!("Skipping table with headers {:?}", headers);
            continue;
        }

        for row in table.select(&ROW_SELECTOR) {
            let cells: Vec<ElementRef> = row.select(&ANY_CELL_SELECTOR).collect();
            let (Some(type_cell), Some(link_cell)) =
                (cells.get(schema.type_column), cells.get(schema.link_column))
            else {
                continue;
            };

            if !normalized_text(*type_cell).contains(schema.document_type) {
                continue;
            }

            if let Some(href) = first_href(*link_cell) {
                tracing::debug!("Matched filing row: '{}'", visible_text(row));
                return Some(href);
            }
        }
    }

    None
}

/// Finds the download href in the row labelled as the digital form of the filing.
pub fn find_download_link(html: &str, schema: &DocumentDetailSchema) -> Option<String> {
    let document = Html::parse_document(html);

    document.select(&ROW_SELECTOR).find_map(|row| {
        let header = row.select(&HEADER_CELL_SELECTOR).next()?;
        if !normalized_text(header).contains(schema.row_label) {
            return None;
        }
        let data_cell = row.select(&DATA_CELL_SELECTOR).next()?;
        first_href(data_cell)
    })
}
