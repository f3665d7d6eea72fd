// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};

/// The four counters of the statistics board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub uploaded: u64,
    pub saved: u64,
    pub unique: u64,
}

/// Stats as the server sends them. Any counter may be missing.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StatsPayload {
    pub total: Option<u64>,
    pub uploaded: Option<u64>,
    pub saved: Option<u64>,
    pub unique: Option<u64>,
}

impl StatsPayload {
    /// Missing upload/save counters are filled from what this session
    /// holds; missing totals read as zero.
    pub fn resolve(self, local: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.unwrap_or(0),
            uploaded: self.uploaded.unwrap_or(local.uploaded),
            saved: self.saved.unwrap_or(local.saved),
            unique: self.unique.unwrap_or(0),
        }
    }
}

impl From<StatsSnapshot> for StatsPayload {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            total: Some(stats.total),
            uploaded: Some(stats.uploaded),
            saved: Some(stats.saved),
            unique: Some(stats.unique),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_falls_back_per_counter() {
        let payload: StatsPayload = serde_json::from_str(r#"{"total": 40, "saved": 0}"#).unwrap();
        let local = StatsSnapshot { total: 3, uploaded: 2, saved: 1, unique: 3 };

        assert_eq!(
            payload.resolve(&local),
            StatsSnapshot { total: 40, uploaded: 2, saved: 0, unique: 0 }
        );
    }
}
