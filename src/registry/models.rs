// src/registry/models.rs
//! Declarative descriptions of the registry pages the navigator reads.
//!
//! All labels are the Czech texts shown on or.justice.cz. Matching is done on
//! trimmed, lower-cased text, so header and row labels are stored lower-cased.
//! A markup change on the registry should only require editing the constants
//! at the bottom of this file.

/// Search results page: the anchor leading to a company's collection of filings.
#[derive(Debug, Clone, Copy)]
pub struct SearchResultsSchema {
    /// Substring of the anchor's visible text (case-sensitive, as rendered).
    pub link_label: &'static str,
}

/// Collection of filings page: the table listing every filed document.
#[derive(Debug, Clone, Copy)]
pub struct FilingsTableSchema {
    /// Every one of these must appear as a complete `th` text in the table.
    pub required_headers: &'static [&'static str],
    /// Cell holding the link to the filing detail page.
    pub link_column: usize,
    /// Cell holding the document type description.
    pub type_column: usize,
    /// Substring of the type cell identifying the wanted document.
    pub document_type: &'static str,
}

/// Filing detail page: the key/value table describing one filing.
#[derive(Debug, Clone, Copy)]
pub struct DocumentDetailSchema {
    /// Substring of the row's `th` text marking the downloadable file row.
    pub row_label: &'static str,
}

/// Query parameters of the company search endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery {
    pub path: &'static str,
    /// Only companies that are currently registered.
    pub only_active: (&'static str, &'static str),
    pub match_kind: (&'static str, &'static str),
    pub page_size: (&'static str, &'static str),
    /// Name of the parameter carrying the company name.
    pub name_param: &'static str,
}

impl SearchQuery {
    /// Fixed parameters followed by the company name, in request order.
    pub fn pairs<'a>(&self, company_name: &'a str) -> [(&'static str, &'a str); 4] {
        [
            self.only_active,
            (self.name_param, company_name),
            self.page_size,
            self.match_kind,
        ]
    }
}

pub const COMPANY_SEARCH: SearchQuery = SearchQuery {
    path: "ias/ui/rejstrik-$firma",
    only_active: ("jenPlatne", "PLATNE"),
    match_kind: ("typHledani", "STARTS_WITH"),
    page_size: ("polozek", "50"),
    name_param: "nazev",
};

pub const SEARCH_RESULTS: SearchResultsSchema = SearchResultsSchema {
    link_label: "Sbírka listin",
};

pub const FILINGS_TABLE: FilingsTableSchema = FilingsTableSchema {
    required_headers: &["typ listiny", "číslo listiny"],
    link_column: 0,
    type_column: 1,
    document_type: "účetní závěrka",
};

pub const DOCUMENT_DETAIL: DocumentDetailSchema = DocumentDetailSchema {
    row_label: "digitální podoba",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_pairs() {
        let pairs = COMPANY_SEARCH.pairs("Acme");
        assert_eq!(
            pairs,
            [
                ("jenPlatne", "PLATNE"),
                ("nazev", "Acme"),
                ("polozek", "50"),
                ("typHledani", "STARTS_WITH"),
            ]
        );
    }

    #[test]
    fn test_labels_are_lowercase_where_matched_lowercased() {
        for header in FILINGS_TABLE.required_headers {
            assert_eq!(*header, header.to_lowercase());
        }
        assert_eq!(FILINGS_TABLE.document_type, FILINGS_TABLE.document_type.to_lowercase());
        assert_eq!(DOCUMENT_DETAIL.row_label, DOCUMENT_DETAIL.row_label.to_lowercase());
    }
}
