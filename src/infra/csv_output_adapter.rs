use crate::app::ports::ReportOutputPort;
use crate::constants::{CSV_HEADER, CSV_TAX_COLUMN};
use crate::error::Result;
use crate::types::ResolvedListing;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File-based implementation of ReportOutputPort.
/// Writes one comma-separated row per resolved listing.
pub struct CsvReportAdapter {
    file_path: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn header(include_tax: bool) -> String {
        let mut columns: Vec<&str> = CSV_HEADER.to_vec();
        if include_tax {
            columns.push(CSV_TAX_COLUMN);
        }
        columns.join(",")
    }

    pub fn row(listing: &ResolvedListing, include_tax: bool) -> String {
        let mut fields = vec![
            listing.listing.price.to_string(),
            escape(&listing.address.house_no),
            escape(&listing.address.street),
            escape(&listing.address.city),
            escape(&listing.parcel.parcel_no),
            listing.parcel.seg_no.to_string(),
            listing.sq_ft.to_string(),
            listing.listing.bed_no.to_string(),
            listing.listing.bath_no.to_string(),
        ];
        if include_tax {
            fields.push(listing.latest_tax.map(|t| t.to_string()).unwrap_or_default());
        }
        fields.join(",")
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl ReportOutputPort for CsvReportAdapter {
    fn write_report(&self, listings: &[ResolvedListing], include_tax: bool) -> Result<()> {
        let dir = self.file_path.parent().unwrap_or(Path::new("."));
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }

        info!("Writing {} listings to {}", listings.len(), self.file_path.display());

        let mut writer = BufWriter::new(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.file_path)?,
        );

        writeln!(writer, "{}", Self::header(include_tax))?;
        for listing in listings {
            writeln!(writer, "{}", Self::row(listing, include_tax))?;
        }
        writer.flush()?;

        Ok(())
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}
