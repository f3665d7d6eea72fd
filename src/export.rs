// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::article::ArticleRecord;
use crate::error::{HubError, Result};

pub const EXPORT_HEADERS: [&str; 5] = [
    "DOI",
    "Title",
    "Protein_Type",
    "Gel_Hardness",
    "Water_Holding_Capacity",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Database dump produced by the server.
    Server,
    /// Generated here from the session's records.
    Local,
}

impl ExportKind {
    fn prefix(self) -> &'static str {
        match self {
            ExportKind::Server => "protein_gelatin_database",
            ExportKind::Local => "protein_gelatin_local",
        }
    }
}

/// `protein_gelatin_database_2025-03-01T09-15-00.csv`
pub fn export_filename(kind: ExportKind, at: DateTime<Utc>) -> String {
    format!("{}_{}.csv", kind.prefix(), at.format("%Y-%m-%dT%H-%M-%S"))
}

/// CSV in the column layout the import understands.
pub fn render_csv<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a ArticleRecord>,
{
    let mut records = records.into_iter().peekable();
    if records.peek().is_none() {
        return Err(HubError::NothingToExport);
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for record in records {
        let hardness = record.hardness.to_string();
        let whc = record.whc.to_string();
        writer.write_record([
            record.doi.as_str(),
            record.title.as_str(),
            record.protein.as_str(),
            hardness.as_str(),
            whc.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| HubError::Io(e.into_error()))
}

/// Writes the bytes into `dir` and returns the full path.
pub async fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
