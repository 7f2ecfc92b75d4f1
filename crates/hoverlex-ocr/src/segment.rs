use std::ops::Range;

use hoverlex_types::{RecognizedLine, Word};

/// Splits recognized lines into single-word lookup units with boxes
#[derive(Debug, Clone, Copy)]
pub struct WordSegmenter {
    /// Maximum per-edge difference under which a sub-range box is considered
    /// to be the whole-line box
    pub box_similarity_tolerance: f64,
}

impl Default for WordSegmenter {
    fn default() -> Self {
        Self {
            box_similarity_tolerance: 0.02,
        }
    }
}

impl WordSegmenter {
    pub fn new(box_similarity_tolerance: f64) -> Self {
        Self {
            box_similarity_tolerance,
        }
    }

    pub fn segment(&self, lines: &[RecognizedLine]) -> Vec<Word> {
        lines.iter().flat_map(|line| self.segment_line(line)).collect()
    }

    pub fn segment_line(&self, line: &RecognizedLine) -> Vec<Word> {
        let chars: Vec<char> = line.text.chars().collect();
        let total = chars.len() as f64;

        token_ranges(&chars)
            .into_iter()
            .map(|range| {
                let bounding_box = line
                    .box_for_range(&range)
                    .filter(|b| !b.is_similar(&line.bounding_box, self.box_similarity_tolerance))
                    .unwrap_or_else(|| {
                        line.bounding_box
                            .horizontal_slice(range.start as f64 / total, range.end as f64 / total)
                    });

                Word {
                    text: chars[range].iter().collect(),
                    bounding_box,
                }
            })
            .collect()
    }
}

/// Character ranges of the letter runs in `chars`.
///
/// Anything that is not alphabetic separates runs, so digit and symbol runs
/// never produce a range. Inside a run, a lower-to-upper transition always
/// splits, and an upper-to-upper transition splits when the next character is
/// lowercase ("HTTPRequest" gives "HTTP" and "Request").
pub fn token_ranges(chars: &[char]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphabetic() {
            if let Some(s) = start.take() {
                ranges.push(s..i);
            }
            continue;
        }

        match start {
            None => start = Some(i),
            Some(s) if is_case_boundary(chars, i) => {
                ranges.push(s..i);
                start = Some(i);
            }
            Some(_) => {}
        }
    }

    if let Some(s) = start {
        ranges.push(s..chars.len());
    }

    ranges
}

fn is_case_boundary(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let cur = chars[i];

    if prev.is_lowercase() && cur.is_uppercase() {
        return true;
    }

    prev.is_uppercase()
        && cur.is_uppercase()
        && chars.get(i + 1).is_some_and(|next| next.is_lowercase())
}
