//! Page and document model: the word lists handed over by the extractor.

use std::borrow::Cow;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::geometry::{reading_order, BBox, Word};

/// Words closer than this (in y0) are considered one text line.
pub const LINE_TOLERANCE: f64 = 3.0;

/// All words of one page plus its dimensions and raw text blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// 1-based page number
    pub number: u32,
    pub width: f64,
    pub height: f64,
    /// Full text as reported by the extractor; rebuilt from words when empty.
    #[serde(default)]
    pub text: String,
    pub words: Vec<Word>,
}

/// A reconstructed text line with the byte span of every word in `text`.
#[derive(Debug, Clone)]
pub struct TextLine<'a> {
    pub text: String,
    spans: Vec<(usize, usize, &'a Word)>,
}

impl TextLine<'_> {
    /// Bounding box of the words touched by the byte range `start..end`.
    pub fn bbox_of(&self, start: usize, end: usize) -> Option<BBox> {
        self.spans
            .iter()
            .filter(|(s, e, _)| *s < end && *e > start)
            .map(|(_, _, w)| w.bbox)
            .reduce(|a, b| a.union(&b))
    }
}

impl PageWords {
    pub fn new(number: u32, width: f64, height: f64, words: Vec<Word>) -> Self {
        let words = words.into_iter().map(|w| w.on_page(number)).collect();
        Self {
            number,
            width,
            height,
            text: String::new(),
            words,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Words grouped into lines, top to bottom.
    pub fn lines(&self) -> Vec<TextLine<'_>> {
        let mut lines = Vec::new();
        let mut current: Option<TextLine<'_>> = None;
        let mut line_y = f64::NEG_INFINITY;

        for w in reading_order(&self.words, LINE_TOLERANCE) {
            let new_line = match &current {
                Some(_) => w.y0() - line_y > LINE_TOLERANCE,
                None => true,
            };
            if new_line {
                if let Some(done) = current.take() {
                    lines.push(done);
                }
                line_y = w.y0();
                current = Some(TextLine {
                    text: String::new(),
                    spans: Vec::new(),
                });
            }
            if let Some(line) = current.as_mut() {
                if !line.text.is_empty() {
                    line.text.push(' ');
                }
                let start = line.text.len();
                line.text.push_str(&w.text);
                line.spans.push((start, line.text.len(), w));
            }
        }
        if let Some(done) = current {
            lines.push(done);
        }
        lines
    }

    /// The page text used for trigger-phrase search.
    pub fn full_text(&self) -> Cow<'_, str> {
        if !self.text.trim().is_empty() {
            return Cow::Borrowed(&self.text);
        }
        let joined = self
            .lines()
            .into_iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n");
        Cow::Owned(joined)
    }

    /// Locate every match of `pattern` on the page, one box per match.
    ///
    /// Phrases are matched per reconstructed line, so a multi-word phrase
    /// yields the union box of the words it spans.
    pub fn find_phrase(&self, pattern: &Regex) -> Vec<BBox> {
        let mut out = Vec::new();
        for line in self.lines() {
            for m in pattern.find_iter(&line.text) {
                if let Some(bbox) = line.bbox_of(m.start(), m.end()) {
                    out.push(bbox);
                }
            }
        }
        out
    }

    /// Words containing `term`, case-insensitively, in reading order.
    pub fn find_term(&self, term: &str) -> Vec<&Word> {
        let needle = term.to_uppercase();
        reading_order(&self.words, LINE_TOLERANCE)
            .into_iter()
            .filter(|w| w.text.to_uppercase().contains(&needle))
            .collect()
    }

    pub fn non_whitespace_chars(&self) -> usize {
        self.full_text().chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// One statement as a sequence of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source_id: String,
    pub pages: Vec<PageWords>,
}

impl Document {
    pub fn new(source_id: impl Into<String>, pages: Vec<PageWords>) -> Self {
        Self {
            source_id: source_id.into(),
            pages,
        }
    }

    /// Parse a JSON word dump and stamp every word with its page number.
    pub fn from_json(s: &str) -> Result<Self> {
        let mut doc: Document = serde_json::from_str(s).context("parse word dump")?;
        for page in doc.pages.iter_mut() {
            let number = page.number;
            for w in page.words.iter_mut() {
                w.page = number;
            }
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageWords {
        PageWords::new(
            1,
            612.0,
            792.0,
            vec![
                Word::new("Detalle", 40.0, 100.0, 70.0, 110.0),
                Word::new("de", 72.0, 100.2, 80.0, 110.0),
                Word::new("Movimientos", 82.0, 100.0, 130.0, 110.0),
                Word::new("Realizados", 132.0, 100.1, 175.0, 111.0),
                Word::new("OPERACION", 430.0, 150.0, 470.0, 160.0),
            ],
        )
    }

    #[test]
    fn test_find_phrase_spans_words() {
        let re = Regex::new(r"Detalle de Movimientos Realizados").unwrap();
        let hits = page().find_phrase(&re);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].x0, 40.0);
        assert_eq!(hits[0].x1, 175.0);
        assert_eq!(hits[0].y1, 111.0);
    }

    #[test]
    fn test_find_term_is_substring_and_case_insensitive() {
        let p = page();
        let hits = p.find_term("oper");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "OPERACION");
    }

    #[test]
    fn test_full_text_rebuilt_from_words() {
        let text = page().full_text().into_owned();
        assert!(text.starts_with("Detalle de Movimientos Realizados"));
        assert!(text.ends_with("OPERACION"));
    }

    #[test]
    fn test_document_from_json_stamps_pages() {
        let json = r#"{"source_id":"s1","pages":[{"number":2,"width":612,"height":792,
            "words":[{"text":"01/ENE","x0":10,"y0":20,"x1":40,"y1":30}]}]}"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.pages[0].words[0].page, 2);
        assert_eq!(doc.pages[0].text, "");
    }
}
