//! CSV rendering of a contribution ledger.

use std::io::Write;

use chrono::{DateTime, SecondsFormat};
use crowdsale_primitives::format_ether;

use crate::{ContributionLedger, ExportError};

/// Column names written when a header row is requested.
pub const CSV_HEADER: [&str; 3] = ["address", "first_payment", "raised"];

/// Formats a unix timestamp as `YYYY-MM-DDTHH:MM:SS+00:00`.
pub fn format_timestamp(timestamp: u64) -> Result<String, ExportError> {
    let secs = i64::try_from(timestamp).map_err(|_| ExportError::InvalidTimestamp(timestamp))?;
    let datetime =
        DateTime::from_timestamp(secs, 0).ok_or(ExportError::InvalidTimestamp(timestamp))?;
    Ok(datetime.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Writes one row per backer: checksummed address, first payment time and
/// ether total.
pub fn write_csv<W: Write>(
    writer: W,
    ledger: &ContributionLedger,
    header: bool,
) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    if header {
        csv.write_record(CSV_HEADER)?;
    }
    for entry in ledger.iter() {
        csv.write_record([
            entry.address.to_checksum(None),
            format_timestamp(entry.first_payment)?,
            format_ether(entry.raised),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}
