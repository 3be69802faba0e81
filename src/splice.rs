use std::fmt;

use thiserror::Error;

use crate::pipeline::Step;

/// Which of the two input documents an anchor was searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Source,
    Target,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Source => f.write_str("source"),
            Document::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("{step}: anchor {anchor:?} not found in {document} document")]
    MissingAnchor {
        step: Step,
        anchor: String,
        document: Document,
    },
}

/// Anchor lookups over one document, tagged with the step that performs them
/// so a miss can say exactly what was missing and where.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    text: &'a str,
    step: Step,
    document: Document,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str, step: Step, document: Document) -> Self {
        Self {
            text,
            step,
            document,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the first occurrence of `anchor`.
    pub fn find(&self, anchor: &str) -> Result<usize, SpliceError> {
        self.find_from(anchor, 0)
    }

    /// Byte offset of the first occurrence of `anchor` at or after `from`.
    pub fn find_from(&self, anchor: &str, from: usize) -> Result<usize, SpliceError> {
        self.text
            .get(from..)
            .and_then(|rest| rest.find(anchor))
            .map(|offset| offset + from)
            .ok_or_else(|| self.missing(anchor))
    }

    /// Byte offset of the last occurrence of `anchor`.
    pub fn rfind(&self, anchor: &str) -> Result<usize, SpliceError> {
        self.text.rfind(anchor).ok_or_else(|| self.missing(anchor))
    }

    /// Slice from the first `start` up to the first `end` that follows it.
    /// `retain` bytes of the end marker are kept in the fragment; pass zero
    /// for an exclusive end.
    pub fn between(&self, start: &str, end: &str, retain: usize) -> Result<&'a str, SpliceError> {
        let from = self.find(start)?;
        let until = self.find_from(end, from)?;
        let stop = until + retain.min(end.len());
        self.text.get(from..stop).ok_or_else(|| self.missing(end))
    }

    fn missing(&self, anchor: &str) -> SpliceError {
        SpliceError::MissingAnchor {
            step: self.step,
            anchor: anchor.to_owned(),
            document: self.document,
        }
    }
}

/// Rebuild `text` with `parts` concatenated at byte offset `at`.
///
/// # Panics
///
/// Panics if `at` is past the end of `text` or not on a char boundary.
/// Offsets from [`Cursor`] lookups always satisfy both.
pub(crate) fn insert_at(text: &str, at: usize, parts: &[&str]) -> String {
    let extra: usize = parts.iter().map(|part| part.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    out.push_str(&text[..at]);
    for part in parts {
        out.push_str(part);
    }
    out.push_str(&text[at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(text: &str) -> Cursor<'_> {
        Cursor::new(text, Step::Styles, Document::Source)
    }

    #[test]
    fn find_from_skips_earlier_occurrences() {
        let c = cursor("ab-ab-ab");
        assert_eq!(c.find("ab").unwrap(), 0);
        assert_eq!(c.find_from("ab", 1).unwrap(), 3);
        assert_eq!(c.find_from("ab", 3).unwrap(), 3);
        assert_eq!(c.rfind("ab").unwrap(), 6);
    }

    #[test]
    fn missing_anchor_names_step_and_document() {
        let err = cursor("nothing here").find("</style>").unwrap_err();
        assert_eq!(
            err,
            SpliceError::MissingAnchor {
                step: Step::Styles,
                anchor: "</style>".into(),
                document: Document::Source,
            }
        );
        let message = err.to_string();
        assert!(message.contains("\"</style>\""));
        assert!(message.contains("source document"));
    }

    #[test]
    fn find_from_past_end_is_a_miss() {
        let c = cursor("abc");
        assert!(c.find_from("c", 10).is_err());
    }

    #[test]
    fn between_ignores_end_marker_before_start() {
        let c = cursor("END start body END tail");
        assert_eq!(c.between("start", "END", 0).unwrap(), "start body ");
        assert_eq!(c.between("start", "END", 2).unwrap(), "start body EN");
    }

    #[test]
    fn between_reports_missing_end() {
        let err = cursor("END start body").between("start", "END", 0).unwrap_err();
        assert!(matches!(err, SpliceError::MissingAnchor { ref anchor, .. } if anchor == "END"));
    }

    #[test]
    fn insert_at_preserves_both_sides() {
        assert_eq!(insert_at("headtail", 4, &["\n", "mid", "\n"]), "head\nmid\ntail");
        assert_eq!(insert_at("tail", 0, &["x"]), "xtail");
        assert_eq!(insert_at("head", 4, &["x"]), "headx");
    }

    #[test]
    #[should_panic]
    fn insert_at_panics_inside_multibyte_char() {
        insert_at("ó", 1, &["x"]);
    }

    #[test]
    fn offsets_respect_multibyte_text() {
        let c = cursor("opción</p></div>");
        let p = c.find("</p>").unwrap();
        let close = c.find_from("</div>", p).unwrap();
        assert_eq!(&c.text()[close..], "</div>");
    }
}
