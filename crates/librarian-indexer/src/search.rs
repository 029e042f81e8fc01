//! Queries over an in-memory index.
//!
//! Every query matches against the full relative path (`src/app.py`, not
//! just `app.py`). Results are ordered by the byte offset of the first
//! match, then by path. A `limit` of 0 means no limit.

use crate::index::{FileRecord, Index};
use crate::scanner::FileType;
use crate::IndexerError;
use regex::RegexBuilder;

/// Read-only query interface over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    index: &'a Index,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    /// Substring search over relative paths.
    pub fn search_by_name(
        &self,
        query: &str,
        case_sensitive: bool,
        limit: usize,
    ) -> Vec<&'a FileRecord> {
        let needle = Needle::new(query, case_sensitive);
        let hits = self
            .index
            .records()
            .filter_map(|r| needle.find(&r.relative_path).map(|pos| (pos, r)))
            .collect();
        rank(hits, limit)
    }

    /// Regex search over relative paths, matching anywhere in the path.
    pub fn search_by_regex(
        &self,
        pattern: &str,
        case_sensitive: bool,
        limit: usize,
    ) -> Result<Vec<&'a FileRecord>, IndexerError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| IndexerError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        let hits = self
            .index
            .records()
            .filter_map(|r| regex.find(&r.relative_path).map(|m| (m.start(), r)))
            .collect();
        Ok(rank(hits, limit))
    }

    /// Records of one type, optionally filtered by a case-insensitive
    /// substring of the path.
    pub fn search_by_type(
        &self,
        file_type: FileType,
        name_pattern: Option<&str>,
        limit: usize,
    ) -> Vec<&'a FileRecord> {
        let needle = name_pattern.map(|p| Needle::new(p, false));
        let hits = self
            .index
            .records()
            .filter(|r| r.file_type == file_type)
            .filter_map(|r| match &needle {
                Some(needle) => needle.find(&r.relative_path).map(|pos| (pos, r)),
                None => Some((0, r)),
            })
            .collect();
        rank(hits, limit)
    }

    /// Like [`search_by_type`](Self::search_by_type) but takes the tag as
    /// text. Unrecognized tags yield no results.
    pub fn search_by_type_tag(
        &self,
        tag: &str,
        name_pattern: Option<&str>,
        limit: usize,
    ) -> Vec<&'a FileRecord> {
        match FileType::parse(tag) {
            Some(file_type) => self.search_by_type(file_type, name_pattern, limit),
            None => Vec::new(),
        }
    }
}

/// A substring query with its case folding applied once.
struct Needle {
    text: String,
    case_sensitive: bool,
}

impl Needle {
    fn new(query: &str, case_sensitive: bool) -> Self {
        let text = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Self {
            text,
            case_sensitive,
        }
    }

    fn find(&self, haystack: &str) -> Option<usize> {
        if self.case_sensitive {
            haystack.find(&self.text)
        } else {
            haystack.to_lowercase().find(&self.text)
        }
    }
}

fn rank(mut hits: Vec<(usize, &FileRecord)>, limit: usize) -> Vec<&FileRecord> {
    hits.sort_by(|(pa, ra), (pb, rb)| {
        pa.cmp(pb).then_with(|| ra.relative_path.cmp(&rb.relative_path))
    });
    if limit > 0 {
        hits.truncate(limit);
    }
    hits.into_iter().map(|(_, r)| r).collect()
}
