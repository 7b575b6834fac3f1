//! Header resolution and row assembly.

use std::collections::HashMap;
use std::io::Read;

use csv::ReaderBuilder;

use super::parse::{parse_bool, parse_date, parse_decimal, parse_int};
use super::types::{ImportColumn, ImportError, ParsedRow};

/// Column order assumed for files without a recognisable header row.
pub const CANONICAL_ORDER: [ImportColumn; 11] = [
    ImportColumn::BranchNumber,
    ImportColumn::CustomerName,
    ImportColumn::MeterNumber,
    ImportColumn::SubscriptionAmps,
    ImportColumn::UnitPrice,
    ImportColumn::SubscriptionFee,
    ImportColumn::CurrReading,
    ImportColumn::PrevReading,
    ImportColumn::InvoiceDate,
    ImportColumn::InvoiceNumber,
    ImportColumn::IsPaid,
];

/// Import parsing logic.
pub struct ImportService;

impl ImportService {
    /// Reads CSV bytes into parsed rows.
    ///
    /// The first record is used as a header row when any of its cells
    /// matches a known column alias; otherwise the canonical column order
    /// is assumed and the first record is data. Blank records are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Csv` when the reader fails; cell-level
    /// problems are captured per-cell in the rows, not raised here.
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ParsedRow>, ImportError> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(reader);

        let mut matrix = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            matrix.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Self::parse_matrix(&matrix))
    }

    /// Parses a pre-decoded cell matrix (the spreadsheet pathway) into
    /// rows, applying the same header resolution as the CSV pathway.
    #[must_use]
    pub fn parse_matrix(matrix: &[Vec<String>]) -> Vec<ParsedRow> {
        let header_map = matrix.first().and_then(|first| Self::resolve_headers(first));

        let (map, data): (HashMap<ImportColumn, usize>, &[Vec<String>]) = match header_map {
            Some(map) => (map, matrix.get(1..).unwrap_or_default()),
            None => (
                CANONICAL_ORDER
                    .iter()
                    .enumerate()
                    .map(|(idx, &column)| (column, idx))
                    .collect(),
                matrix,
            ),
        };

        data.iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|(idx, cells)| Self::parse_row(idx + 1, cells, &map))
            .collect()
    }

    /// Maps header cells to logical columns via the alias table.
    ///
    /// Returns `None` when not a single alias matches — the row is then
    /// data, not a header.
    #[must_use]
    pub fn resolve_headers(headers: &[String]) -> Option<HashMap<ImportColumn, usize>> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();

        let mut map = HashMap::new();
        for column in CANONICAL_ORDER {
            let found = column.aliases().iter().find_map(|alias| {
                let alias = normalize(alias);
                normalized.iter().position(|header| *header == alias)
            });
            if let Some(idx) = found {
                map.insert(column, idx);
            }
        }

        (!map.is_empty()).then_some(map)
    }

    fn parse_row(
        line: usize,
        cells: &[String],
        map: &HashMap<ImportColumn, usize>,
    ) -> ParsedRow {
        let cell = |column: ImportColumn| -> &str {
            map.get(&column)
                .and_then(|&idx| cells.get(idx))
                .map_or("", |s| s.as_str())
        };
        let text = |column: ImportColumn| -> Option<String> {
            let trimmed = cell(column).trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        ParsedRow {
            line,
            branch_number: text(ImportColumn::BranchNumber),
            customer_name: text(ImportColumn::CustomerName),
            meter_number: text(ImportColumn::MeterNumber),
            subscription_amps: parse_int(cell(ImportColumn::SubscriptionAmps)),
            unit_price: parse_decimal(cell(ImportColumn::UnitPrice)),
            subscription_fee: parse_decimal(cell(ImportColumn::SubscriptionFee)),
            curr_reading: parse_int(cell(ImportColumn::CurrReading)),
            prev_reading: parse_int(cell(ImportColumn::PrevReading)),
            invoice_date: parse_date(cell(ImportColumn::InvoiceDate)),
            invoice_number: text(ImportColumn::InvoiceNumber),
            is_paid: parse_bool(cell(ImportColumn::IsPaid)),
        }
    }

    /// Strict-mode gate: the first unusable cell across the batch becomes
    /// the batch's rejection.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::BadCell` naming row, column, and raw value.
    pub fn ensure_strict(rows: &[ParsedRow]) -> Result<(), ImportError> {
        for row in rows {
            if let Some((column, raw)) = row.first_invalid() {
                return Err(ImportError::BadCell {
                    line: row.line,
                    column: column.name(),
                    raw,
                });
            }
        }
        Ok(())
    }
}

/// Lowercases and strips spaces/underscores so `"Unit Price"`,
/// `"unit_price"` and `"UNITPRICE"` all meet in the middle.
fn normalize(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
