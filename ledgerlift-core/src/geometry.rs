//! Positioned word tokens as produced by the upstream word extractor.
//!
//! Coordinates are PDF points with a top-left origin: `y` grows downwards.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// One positioned text token. The engine never mutates words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(flatten)]
    pub bbox: BBox,
    /// 1-based page number
    #[serde(default)]
    pub page: u32,
}

impl Word {
    pub fn new(text: impl Into<String>, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            text: text.into(),
            bbox: BBox::new(x0, y0, x1, y1),
            page: 0,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn x0(&self) -> f64 {
        self.bbox.x0
    }

    pub fn y0(&self) -> f64 {
        self.bbox.y0
    }

    pub fn x1(&self) -> f64 {
        self.bbox.x1
    }

    pub fn y1(&self) -> f64 {
        self.bbox.y1
    }

    pub fn has_digit(&self) -> bool {
        self.text.chars().any(|c| c.is_ascii_digit())
    }
}

/// Sort words into reading order: lines top to bottom, each line left to right.
///
/// Words whose `y0` lies within `line_tolerance` of the first word of the
/// current line are treated as the same line, so small baseline jitter does
/// not reorder tokens of one line.
pub fn reading_order<'a>(words: impl IntoIterator<Item = &'a Word>, line_tolerance: f64) -> Vec<&'a Word> {
    let mut sorted: Vec<&Word> = words.into_iter().collect();
    sorted.sort_by(|a, b| a.y0().total_cmp(&b.y0()));

    let mut out = Vec::with_capacity(sorted.len());
    let mut line: Vec<&Word> = Vec::new();
    let mut line_y = f64::NEG_INFINITY;

    for w in sorted {
        if !line.is_empty() && w.y0() - line_y > line_tolerance {
            line.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
            out.append(&mut line);
        }
        if line.is_empty() {
            line_y = w.y0();
        }
        line.push(w);
    }
    line.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
    out.append(&mut line);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers() {
        let b = BBox::new(10.0, 20.0, 30.0, 30.0);
        assert_eq!(b.center_x(), 20.0);
        assert_eq!(b.center_y(), 25.0);
    }

    #[test]
    fn test_reading_order_tolerates_baseline_jitter() {
        let words = vec![
            Word::new("7188", 60.0, 100.6, 80.0, 110.0),
            Word::new("AUTOZONE", 10.0, 101.0, 55.0, 110.0),
            Word::new("next", 10.0, 115.0, 30.0, 125.0),
        ];
        let ordered: Vec<&str> = reading_order(&words, 3.0).iter().map(|w| w.text.as_str()).collect();
        assert_eq!(ordered, vec!["AUTOZONE", "7188", "next"]);
    }

    #[test]
    fn test_word_json_is_flat() {
        let w: Word = serde_json::from_str(r#"{"text":"CARGOS","x0":1.0,"y0":2.0,"x1":3.0,"y1":4.0}"#).unwrap();
        assert_eq!(w.bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(w.page, 0);
    }
}
