// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use reqwest::StatusCode;
use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Input problems caught before anything is sent to the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a DOI to check for duplicates.")]
    EmptyDoi,

    #[error("Please enter a valid DOI format (e.g., 10.1000/example), got '{0}'")]
    MalformedDoi(String),

    #[error("Please select a CSV or Excel file to upload.")]
    NoFileSelected,

    #[error("Please select a valid CSV or Excel file (.csv, .xlsx, .xls), got '{0}'")]
    UnsupportedFileType(String),

    #[error("File size must be less than {}MB ({} bytes given)", .limit / MIB, .size)]
    FileTooLarge { size: u64, limit: u64 },

    #[error("No valid DOI entries found in the file. Please check the file format.")]
    NoValidRows,

    #[error("Email and password are required.")]
    MissingCredentials,
}

#[derive(Error, Debug)]
pub enum HubError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Server error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Excel file processing requires additional libraries. Please convert '{0}' to CSV format.")]
    UnsupportedFormat(String),

    #[error("Failed to parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No data available to export.")]
    NothingToExport,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HubError {
    /// Failures of the round trip to the server, as opposed to local problems.
    pub fn is_transport(&self) -> bool {
        matches!(self, HubError::Status { .. } | HubError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_reports_limit_in_megabytes() {
        let err = ValidationError::FileTooLarge { size: 60 * MIB, limit: 50 * MIB };
        assert!(err.to_string().starts_with("File size must be less than 50MB"));
    }

    #[test]
    fn only_server_round_trips_count_as_transport() {
        let status = HubError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(status.is_transport());
        assert!(!HubError::NothingToExport.is_transport());
        assert!(!HubError::from(ValidationError::EmptyDoi).is_transport());
    }
}
