// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^10\.\d{4,}/[-._;()/:a-zA-Z0-9]+$").unwrap()
});

static RESOLVER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://(dx\.)?doi\.org/|doi:)").unwrap()
});

fn strip_resolver(doi: &str) -> &str {
    match RESOLVER_PREFIX.find(doi) {
        Some(prefix) => &doi[prefix.end()..],
        None => doi,
    }
}

/// True when `doi` looks like `10.<registrant>/<suffix>`. A pasted
/// `https://doi.org/` link is accepted too, since it normalizes to the same key.
pub fn is_valid(doi: &str) -> bool {
    DOI_PATTERN.is_match(strip_resolver(doi.trim()).trim())
}

/// Canonical duplicate key: trimmed, lower-cased, resolver prefix removed.
pub fn normalize(doi: &str) -> String {
    strip_resolver(doi.trim()).trim().to_lowercase()
}

/// Validation the way the submit button does it: empty first, then format.
pub fn validate(doi: &str) -> Result<(), ValidationError> {
    let doi = doi.trim();
    if doi.is_empty() {
        return Err(ValidationError::EmptyDoi);
    }
    if !is_valid(doi) {
        return Err(ValidationError::MalformedDoi(doi.to_string()));
    }
    Ok(())
}
