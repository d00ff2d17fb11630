// src/migrate/shortcode.rs

//! Shortcode marker extraction and rewriting
//!
//! Markers look like `[singlepic=<digits> ...]`. Everything after the id up to
//! the first closing bracket is free text (width, float, etc.) and is dropped
//! when the marker is replaced.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::types::LegacyPictureId;

/// Marker kinds this tool knows how to migrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcodeKind {
    /// `[singlepic=<id> ...]`
    SinglePic,
}

impl ShortcodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcodeKind::SinglePic => "singlepic",
        }
    }

    /// Regex matching one marker, capturing the numeric id as `id`
    fn marker_pattern(&self) -> String {
        format!(r"\[{}=(?P<id>\d+)[^\]]*\]", regex::escape(self.as_str()))
    }

    /// SQL `LIKE` pattern that selects bodies possibly holding a marker
    pub fn like_pattern(&self) -> String {
        format!("%[{}%]%", self.as_str())
    }
}

impl fmt::Display for ShortcodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortcodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "singlepic" => Ok(ShortcodeKind::SinglePic),
            other => Err(Error::UnsupportedKindError(other.to_string())),
        }
    }
}

/// Finds and replaces markers of one shortcode kind
#[derive(Debug, Clone)]
pub struct ShortcodeExtractor {
    pattern: Regex,
}

impl ShortcodeExtractor {
    pub fn new(kind: ShortcodeKind) -> Result<Self> {
        let pattern = Regex::new(&kind.marker_pattern())
            .map_err(|e| Error::ParseError(format!("{kind} marker pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// All referenced ids in document order, duplicates kept.
    ///
    /// Ids too large for an integer are treated like any other malformed
    /// marker and skipped.
    pub fn extract(&self, body: &str) -> Vec<LegacyPictureId> {
        self.pattern
            .captures_iter(body)
            .filter_map(|caps| parse_id(&caps))
            .collect()
    }

    /// Referenced ids in order of first occurrence
    pub fn unique_ids(&self, body: &str) -> Vec<LegacyPictureId> {
        let mut seen = HashSet::new();
        self.extract(body)
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Replace every marker whose id has markup in `replacements`.
    ///
    /// Markers for other ids are copied through unchanged. Returns the new
    /// body and the number of markers replaced.
    pub fn rewrite(
        &self,
        body: &str,
        replacements: &HashMap<LegacyPictureId, String>,
    ) -> (String, usize) {
        let mut replaced = 0;
        let rewritten = self.pattern.replace_all(body, |caps: &Captures| {
            match parse_id(caps).and_then(|id| replacements.get(&id)) {
                Some(markup) => {
                    replaced += 1;
                    markup.clone()
                }
                None => caps[0].to_string(),
            }
        });
        (rewritten.into_owned(), replaced)
    }
}

fn parse_id(caps: &Captures) -> Option<LegacyPictureId> {
    caps.name("id")?.as_str().parse().ok().map(LegacyPictureId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ShortcodeExtractor {
        ShortcodeExtractor::new(ShortcodeKind::SinglePic).unwrap()
    }

    fn ids(raw: &[i64]) -> Vec<LegacyPictureId> {
        raw.iter().copied().map(LegacyPictureId).collect()
    }

    #[test]
    fn test_extract_in_document_order_with_duplicates() {
        let body = "a [singlepic=5 w=100] b [singlepic=12] c [singlepic=5 float=left]";
        assert_eq!(extractor().extract(body), ids(&[5, 12, 5]));
        assert_eq!(extractor().unique_ids(body), ids(&[5, 12]));
    }

    #[test]
    fn test_extract_skips_malformed_markers() {
        let body = "[singlepic=abc] [singlepic=] [SinglePic=4] [singlepic =3] [singlepic=7]";
        assert_eq!(extractor().extract(body), ids(&[7]));
    }

    #[test]
    fn test_extract_skips_overflowing_id() {
        let body = "[singlepic=99999999999999999999999] [singlepic=2]";
        assert_eq!(extractor().extract(body), ids(&[2]));
    }

    #[test]
    fn test_extract_no_markers() {
        assert!(extractor().extract("plain text [gallery=1]").is_empty());
    }

    #[test]
    fn test_rewrite_replaces_all_occurrences() {
        let mut map = HashMap::new();
        map.insert(LegacyPictureId(5), "<a>A123</a>".to_string());

        let (body, count) = extractor().rewrite("see [singlepic=5 w=100] and [singlepic=5]", &map);
        assert_eq!(body, "see <a>A123</a> and <a>A123</a>");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_rewrite_leaves_unmapped_and_prefix_ids() {
        let mut map = HashMap::new();
        map.insert(LegacyPictureId(5), "<img/>".to_string());

        let (body, count) =
            extractor().rewrite("[singlepic=55] [singlepic=5] [singlepic=77 w=1]", &map);
        assert_eq!(body, "[singlepic=55] <img/> [singlepic=77 w=1]");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rewrite_is_idempotent_for_resolved_ids() {
        let mut map = HashMap::new();
        map.insert(LegacyPictureId(1), "<a>1</a>".to_string());
        map.insert(LegacyPictureId(2), "<a>2</a>".to_string());

        let ex = extractor();
        let (body, _) = ex.rewrite("[singlepic=1][singlepic=2 x][singlepic=3]", &map);
        assert_eq!(ex.extract(&body), ids(&[3]));

        let (again, count) = ex.rewrite(&body, &map);
        assert_eq!(again, body);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("singlepic".parse::<ShortcodeKind>().unwrap(), ShortcodeKind::SinglePic);
        let err = "nggallery".parse::<ShortcodeKind>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedKindError(ref k) if k == "nggallery"));
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(ShortcodeKind::SinglePic.like_pattern(), "%[singlepic%]%");
    }
}
