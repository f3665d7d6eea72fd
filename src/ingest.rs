// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::article::{ArticleRecord, FlagPolicy};
use crate::doi;
use crate::error::{HubError, Result, ValidationError};
use crate::state::UploadedDataSet;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/csv",
    "text/plain",
];

const ALLOWED_EXTENSIONS: &[&str] = &[".csv", ".xlsx", ".xls"];

// Column spellings seen in the shared spreadsheets, first non-empty wins.
const DOI_COLUMNS: &[&str] = &["DOI", "doi"];
const TITLE_COLUMNS: &[&str] = &["Title", "title"];
const PROTEIN_COLUMNS: &[&str] = &["Protein_Type", "protein", "Protein"];
const HARDNESS_COLUMNS: &[&str] = &["Gel_Hardness", "hardness"];
const WHC_COLUMNS: &[&str] = &["Water_Holding_Capacity", "whc", "WHC"];

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), mime: None, bytes }
    }

    #[cfg(test)]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type sent with the multipart part.
    pub fn content_type(&self) -> &str {
        if let Some(mime) = &self.mime {
            return mime;
        }
        match detect_format(&self.name, None) {
            Some(FileFormat::Excel) if self.name.to_lowercase().ends_with(".xls") => {
                "application/vnd.ms-excel"
            }
            Some(FileFormat::Excel) => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            _ => "text/csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

fn detect_format(name: &str, mime: Option<&str>) -> Option<FileFormat> {
    let name = name.to_lowercase();
    if name.ends_with(".csv") {
        return Some(FileFormat::Csv);
    }
    if name.ends_with(".xlsx") || name.ends_with(".xls") {
        return Some(FileFormat::Excel);
    }
    match mime? {
        "text/csv" | "application/csv" | "text/plain" => Some(FileFormat::Csv),
        "application/vnd.ms-excel"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(FileFormat::Excel),
        _ => None,
    }
}

/// Type and size checks done before the file is read.
pub fn validate_file(file: &UploadFile, max_bytes: u64) -> std::result::Result<FileFormat, ValidationError> {
    let lower = file.name.to_lowercase();
    let valid_type = file.mime.as_deref().is_some_and(|m| ALLOWED_MIME_TYPES.contains(&m));
    let valid_extension = ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));

    if !valid_type && !valid_extension {
        return Err(ValidationError::UnsupportedFileType(file.name.clone()));
    }

    if file.size() > max_bytes {
        return Err(ValidationError::FileTooLarge {
            size: file.size(),
            limit: max_bytes,
        });
    }

    detect_format(&file.name, file.mime.as_deref())
        .ok_or_else(|| ValidationError::UnsupportedFileType(file.name.clone()))
}

pub type CsvRow = HashMap<String, String>;

/// Rows keyed by the header line. Blank lines are skipped, quoting is
/// removed and short rows get empty cells.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().replace('"', ""))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn pick<'a>(row: &'a CsvRow, columns: &[&str]) -> &'a str {
    columns
        .iter()
        .filter_map(|column| row.get(*column))
        .map(|cell| cell.trim())
        .find(|cell| !cell.is_empty())
        .unwrap_or("")
}

/// Keeps rows whose DOI validates and maps them onto the canonical fields.
pub fn records_from_rows(rows: &[CsvRow], policy: FlagPolicy) -> Vec<ArticleRecord> {
    rows.iter()
        .filter(|row| doi::is_valid(pick(row, DOI_COLUMNS)))
        .map(|row| ArticleRecord {
            doi: doi::normalize(pick(row, DOI_COLUMNS)),
            title: pick(row, TITLE_COLUMNS).to_string(),
            protein: pick(row, PROTEIN_COLUMNS).to_string(),
            hardness: policy.interpret(pick(row, HARDNESS_COLUMNS)),
            whc: policy.interpret(pick(row, WHC_COLUMNS)),
            timestamp: None,
        })
        .collect()
}

/// Validates, parses and filters a file into the local data set.
pub fn ingest(file: &UploadFile, max_bytes: u64, policy: FlagPolicy) -> Result<UploadedDataSet> {
    let format = validate_file(file, max_bytes)?;
    let rows = match format {
        FileFormat::Csv => parse_csv(&String::from_utf8_lossy(&file.bytes))?,
        FileFormat::Excel => return Err(HubError::UnsupportedFormat(file.name.clone())),
    };

    let records = records_from_rows(&rows, policy);
    debug!("{}: {} rows, {} with a valid DOI", file.name, rows.len(), records.len());

    if records.is_empty() {
        return Err(ValidationError::NoValidRows.into());
    }
    Ok(UploadedDataSet::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::FlagValue;

    const MIB: u64 = 1024 * 1024;

    fn csv(name: &str, text: &str) -> UploadFile {
        UploadFile::new(name, text.as_bytes().to_vec())
    }

    #[test]
    fn allow_list_accepts_extension_or_mime() {
        assert_eq!(validate_file(&csv("a.CSV", ""), MIB), Ok(FileFormat::Csv));
        assert_eq!(validate_file(&csv("a.xlsx", ""), MIB), Ok(FileFormat::Excel));
        assert_eq!(
            validate_file(&csv("export", "").with_mime("text/plain"), MIB),
            Ok(FileFormat::Csv)
        );
        assert_eq!(
            validate_file(&csv("notes.pdf", ""), MIB),
            Err(ValidationError::UnsupportedFileType("notes.pdf".into()))
        );
    }

    #[test]
    fn limit_is_configurable() {
        let file = UploadFile::new("big.csv", vec![b'x'; 11 * MIB as usize]);
        assert!(validate_file(&file, 50 * MIB).is_ok());
        assert_eq!(
            validate_file(&file, 10 * MIB),
            Err(ValidationError::FileTooLarge { size: 11 * MIB, limit: 10 * MIB })
        );
    }

    #[test]
    fn parses_headers_quotes_and_blank_lines() {
        let rows = parse_csv(
            "\u{feff}\"DOI\", \"Title\"\n\"10.1000/a\",\"Gel, firm\"\n\n   \n10.1000/b\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["DOI"], "10.1000/a");
        assert_eq!(rows[0]["Title"], "Gel, firm");
        assert_eq!(rows[1]["Title"], "");
    }

    #[test]
    fn maps_alternate_spellings() {
        let rows = parse_csv(
            "doi,title,Protein,hardness,WHC\nHTTPS://DOI.ORG/10.1000/XY,Fish gelatin,collagen,yes,no\n",
        )
        .unwrap();
        let records = records_from_rows(&rows, FlagPolicy::Boolean);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].doi, "10.1000/xy");
        assert_eq!(records[0].protein, "collagen");
        assert_eq!(records[0].hardness, FlagValue::Flag(true));
        assert_eq!(records[0].whc, FlagValue::Flag(false));
    }

    #[test]
    fn zero_valid_rows_rejects_the_file() {
        let file = csv("papers.csv", "DOI,Title\nnot-a-doi,Something\n");
        match ingest(&file, MIB, FlagPolicy::Boolean) {
            Err(HubError::Validation(ValidationError::NoValidRows)) => {}
            other => panic!("expected NoValidRows, got {:?}", other),
        }
    }

    #[test]
    fn excel_is_declared_unsupported() {
        let file = UploadFile::new("sheet.xlsx", vec![0x50, 0x4b, 0x03, 0x04]);
        assert!(matches!(
            ingest(&file, MIB, FlagPolicy::Boolean),
            Err(HubError::UnsupportedFormat(name)) if name == "sheet.xlsx"
        ));
    }

    #[test]
    fn invalid_rows_are_dropped() {
        let file = csv("papers.csv", "DOI,Title\n10.1000/ok,A\nabc/123,B\n10.12/short,C\n");
        let data = ingest(&file, MIB, FlagPolicy::Boolean).unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.contains("10.1000/OK"));
    }
}
