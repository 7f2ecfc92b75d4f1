use hoverlex_types::{Size, VerticalOrigin};
use serde::{Deserialize, Serialize};

fn default_width() -> f64 {
    520.0
}

fn default_height() -> f64 {
    140.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// Nominal capture size in UI units, centered on the pointer
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Vertical origin used by the capture backend for its source rectangle
    pub origin: VerticalOrigin,
}

impl CaptureConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            origin: VerticalOrigin::default(),
        }
    }
}
