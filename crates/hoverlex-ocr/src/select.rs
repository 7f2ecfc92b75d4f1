use hoverlex_types::{Point, Word};

/// Nearest-hit selection of the word under the pointer
#[derive(Debug, Clone, Copy)]
pub struct WordSelector {
    /// Growth applied to every box before hit testing, in normalized units
    pub hit_tolerance: f64,
}

impl Default for WordSelector {
    fn default() -> Self {
        Self {
            hit_tolerance: 0.01,
        }
    }
}

impl WordSelector {
    pub fn new(hit_tolerance: f64) -> Self {
        Self { hit_tolerance }
    }

    /// `point` is normalized to the captured image. `None` means no word is
    /// under the pointer.
    pub fn select<'a>(&self, words: &'a [Word], point: Point) -> Option<&'a Word> {
        words
            .iter()
            .filter(|w| w.bounding_box.expanded(self.hit_tolerance).contains(point))
            .min_by(|a, b| {
                let da = a.bounding_box.center().distance(point);
                let db = b.bounding_box.center().distance(point);
                da.total_cmp(&db)
            })
    }
}
