//! CSV export writer.

use std::io::Write;

use csv::WriterBuilder;

use super::types::ExportRow;

/// Export writing logic.
pub struct ExportService;

impl ExportService {
    /// Writes rows as CSV with the fixed header order.
    ///
    /// # Errors
    ///
    /// Returns a `csv::Error` if serialization or the underlying writer
    /// fails.
    pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<(), csv::Error> {
        let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);

        // The serializer only emits headers alongside a first record; an
        // empty export still gets the header row.
        if rows.is_empty() {
            csv_writer.write_record(super::types::EXPORT_HEADERS)?;
        }
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
