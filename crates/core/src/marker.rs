// SPDX-License-Identifier: MIT

//! Streaming substring matcher for the completion sentinel.
//!
//! EDA tools emit megabytes of output with no structural end-of-response
//! token, so completion is detected by scanning for a caller-chosen marker
//! string that may be split across arbitrarily many read chunks.

/// Bound on the sliding tail buffer, in bytes.
const MAX_BUFFER: usize = 8 * 1024;

/// Streaming detector for one marker string across chunk boundaries.
pub struct MarkerEngine {
    marker: Vec<u8>,
    tail: Vec<u8>,
    found: bool,
}

impl MarkerEngine {
    /// Builds an engine that looks for `prefix + " " + token`.
    pub fn new(prefix: &str, token: &str) -> Self {
        let marker = format!("{} {}", prefix, token).into_bytes();
        Self {
            marker,
            tail: Vec::new(),
            found: false,
        }
    }

    /// Feeds one chunk of bytes and reports whether the marker has now
    /// been seen (sticky: once true, stays true).
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        if self.found {
            return true;
        }
        self.tail.extend_from_slice(chunk);
        if contains(&self.tail, &self.marker) {
            self.found = true;
            self.tail.clear();
            return true;
        }
        self.trim_tail();
        false
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Keeps enough of the tail to catch a marker split across the next
    /// chunk boundary (`len(marker) - 1` bytes), capped at `MAX_BUFFER`.
    fn trim_tail(&mut self) {
        let overlap = self.marker.len().saturating_sub(1);
        let keep = overlap.min(MAX_BUFFER);
        if self.tail.len() > keep {
            let drop = self.tail.len() - keep;
            self.tail.drain(0..drop);
        }
        if self.tail.len() > MAX_BUFFER {
            let drop = self.tail.len() - MAX_BUFFER;
            self.tail.drain(0..drop);
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return needle.is_empty();
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
#[path = "marker_tests.rs"]
mod tests;
