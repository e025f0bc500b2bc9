//! Listing table extraction.
//!
//! A listing page is an HTML table of recently seen malicious hosts. Rows are
//! located with a fixed structural selector and read from fixed column
//! positions; the cell text is only trimmed, never validated here.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ExtractError, RowAnomaly};

/// Structural path to sample rows in the listing markup.
pub const ROW_SELECTOR: &str = "font > center > table.prettytable > tbody > tr.class1";
const CELL_SELECTOR: &str = "td";
const LINK_SELECTOR: &str = "a";

pub const DATE_COLUMN: usize = 0;
pub const HOST_COLUMN: usize = 1;
pub const IP_COLUMN: usize = 2;
pub const COUNTRY_COLUMN: usize = 3;
pub const HASH_COLUMN: usize = 6;

/// One listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Host and path the sample is served from, without a scheme.
    pub host: String,
    /// Upstream identifier; also the file name the sample is stored under.
    pub file_hash: String,
    pub date: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
}

/// Compiled selectors for the listing table.
pub struct TableLayout {
    row: Selector,
    cell: Selector,
    link: Selector,
}

impl TableLayout {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            row: compile(ROW_SELECTOR)?,
            cell: compile(CELL_SELECTOR)?,
            link: compile(LINK_SELECTOR)?,
        })
    }

    fn read_row(&self, position: usize, row: ElementRef<'_>) -> Result<RowRecord, RowAnomaly> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cell).collect();
        let missing = |column| RowAnomaly::MissingColumn {
            row: position,
            column,
        };

        let host = cells.get(HOST_COLUMN).ok_or_else(|| missing(HOST_COLUMN))?;
        let hash_cell = cells.get(HASH_COLUMN).ok_or_else(|| missing(HASH_COLUMN))?;
        let file_hash: String = hash_cell
            .select(&self.link)
            .flat_map(|a| a.text())
            .collect();

        Ok(RowRecord {
            host: cell_text(*host),
            file_hash: file_hash.trim().to_string(),
            date: cells.get(DATE_COLUMN).map(|c| cell_text(*c)),
            ip: cells.get(IP_COLUMN).map(|c| cell_text(*c)),
            country: cells.get(COUNTRY_COLUMN).map(|c| cell_text(*c)),
        })
    }
}

fn compile(selector: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError {
        selector,
        message: e.to_string(),
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// One fetched and parsed listing page.
pub struct ListingPage {
    index: u32,
    document: Html,
}

impl ListingPage {
    pub fn parse(index: u32, html: &str) -> Self {
        Self {
            index,
            document: Html::parse_document(html),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Rows in document order, one item per row matching [`ROW_SELECTOR`].
    ///
    /// Each call starts a fresh pass over the document.
    pub fn rows<'a>(
        &'a self,
        layout: &'a TableLayout,
    ) -> impl Iterator<Item = Result<RowRecord, RowAnomaly>> + 'a {
        self.document
            .select(&layout.row)
            .enumerate()
            .map(move |(position, row)| layout.read_row(position, row))
    }
}

/// Convenience wrapper over [`ListingPage::rows`].
pub fn extract_rows<'a>(
    page: &'a ListingPage,
    layout: &'a TableLayout,
) -> impl Iterator<Item = Result<RowRecord, RowAnomaly>> + 'a {
    page.rows(layout)
}
