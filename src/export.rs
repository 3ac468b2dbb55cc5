use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::record::OutputRecord;

/// Header row of the output file, in column order
pub const COLUMNS: [&str; 14] = [
    "URL",
    "Title",
    "Description",
    "Channel Title",
    "Keyword Tags",
    "Category",
    "Topic Details",
    "Published At",
    "Duration",
    "View Count",
    "Comment Count",
    "Captions Available",
    "Caption Text",
    "Recording Location",
];

/// Name of the file the results for `genre` are saved as
pub fn output_filename(genre: &str) -> String {
    format!("videos_{}.csv", genre)
}

/// Write header and records as CSV. The header is written even when there
/// are no records
pub fn write_records<W: std::io::Write>(records: &[OutputRecord], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(&COLUMNS)?;
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save records to `videos_<genre>.csv` in `dir`, returning the path written
pub fn save(genre: &str, records: &[OutputRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(output_filename(genre));
    debug!("Writing {} records to {:?}", records.len(), &path);

    let f = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create output file {:?}", &path))?;
    write_records(records, std::io::BufWriter::new(f))
        .with_context(|| format!("Failed to write {:?}", &path))?;

    Ok(path)
}
