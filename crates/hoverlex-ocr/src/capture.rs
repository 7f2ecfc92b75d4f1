use anyhow::Result;
use async_trait::async_trait;
use hoverlex_config::capture::CaptureConfig;
use hoverlex_types::{CaptureRegion, Display, Point, Rect, Size, VerticalOrigin};
use image::RgbaImage;

/// Enumerates attached displays in a stable order
pub trait DisplaySource: Send + Sync {
    fn displays(&self) -> Result<Vec<Display>>;
}

/// Current pointer location in global UI space
pub trait PointerSource: Send + Sync {
    fn position(&self) -> Option<Point>;
}

/// Grabs the pixels of a planned region
#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    async fn capture(&self, region: &CaptureRegion) -> Result<RgbaImage>;
}

/// Computes the rectangle grabbed around the pointer and converts between
/// UI space, device pixels and normalized image space.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRegionPlanner {
    size: Size,
    capture_origin: VerticalOrigin,
}

impl CaptureRegionPlanner {
    pub fn new(size: Size, capture_origin: VerticalOrigin) -> Self {
        Self {
            size,
            capture_origin,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.size(), config.origin)
    }

    /// First display, in enumeration order, whose frame contains `point`.
    /// Edges count as inside, so a point on a shared boundary resolves to
    /// whichever display was listed first.
    pub fn display_at<'a>(&self, displays: &'a [Display], point: Point) -> Option<&'a Display> {
        displays.iter().find(|d| d.frame.contains(point))
    }

    pub fn plan(&self, pointer: Point, displays: &[Display]) -> Option<CaptureRegion> {
        let display = self.display_at(displays, pointer)?;
        let rect = Rect::centered(pointer, self.size).intersection(&display.frame)?;

        Some(CaptureRegion {
            rect,
            display_id: display.id,
            scale_factor: display.scale_factor,
            pixel_rect: self.device_rect(&rect, display),
        })
    }

    fn device_rect(&self, rect: &Rect, display: &Display) -> Rect {
        let local_x = rect.x - display.frame.x;
        let local_y = rect.y - display.frame.y;
        let local_y = match self.capture_origin {
            VerticalOrigin::TopLeft => local_y,
            VerticalOrigin::BottomLeft => display.frame.height - (local_y + rect.height),
        };

        let scale = display.scale_factor;
        Rect::new(
            local_x * scale,
            local_y * scale,
            rect.width * scale,
            rect.height * scale,
        )
    }
}

/// Pointer position relative to the captured image, `[0, 1]` on both axes
pub fn normalized_point(region: &CaptureRegion, point: Point) -> Point {
    let rect = region.rect;
    Point::new(
        (point.x - rect.x) / rect.width,
        (point.y - rect.y) / rect.height,
    )
}

/// Map a normalized image box back to global UI space
pub fn to_screen(region: &CaptureRegion, normalized: &Rect) -> Rect {
    let rect = region.rect;
    Rect::new(
        rect.x + normalized.x * rect.width,
        rect.y + normalized.y * rect.height,
        normalized.width * rect.width,
        normalized.height * rect.height,
    )
}

#[cfg(feature = "xcap")]
pub use self::xcap_backend::XcapScreen;

#[cfg(feature = "xcap")]
mod xcap_backend {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use hoverlex_types::{CaptureRegion, Display, Rect};
    use image::RgbaImage;
    use xcap::Monitor;

    use super::{DisplaySource, ScreenCapturer};

    /// Display enumeration and region capture through `xcap`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct XcapScreen;

    fn to_display(monitor: &Monitor) -> Display {
        let scale = f64::from(monitor.scale_factor()).max(1.0);
        Display {
            id: monitor.id(),
            frame: Rect::new(
                f64::from(monitor.x()) / scale,
                f64::from(monitor.y()) / scale,
                f64::from(monitor.width()) / scale,
                f64::from(monitor.height()) / scale,
            ),
            scale_factor: scale,
        }
    }

    fn capture_blocking(region: CaptureRegion) -> Result<RgbaImage> {
        let monitors = Monitor::all().context("Failed to get monitors")?;
        let monitor = monitors
            .iter()
            .find(|m| m.id() == region.display_id)
            .with_context(|| format!("Display {} is gone", region.display_id))?;

        let image = monitor.capture_image().context("Failed to capture screen")?;

        let px = &region.pixel_rect;
        let x = (px.x.max(0.0) as u32).min(image.width());
        let y = (px.y.max(0.0) as u32).min(image.height());
        let width = (px.width.round() as u32).min(image.width() - x);
        let height = (px.height.round() as u32).min(image.height() - y);
        anyhow::ensure!(width > 0 && height > 0, "Capture region is empty");

        let cropped = xcap::image::imageops::crop_imm(&image, x, y, width, height).to_image();
        RgbaImage::from_raw(width, height, cropped.into_raw())
            .context("Captured buffer does not match its dimensions")
    }

    impl DisplaySource for XcapScreen {
        fn displays(&self) -> Result<Vec<Display>> {
            let monitors = Monitor::all().context("Failed to get monitors")?;
            Ok(monitors.iter().map(to_display).collect())
        }
    }

    #[async_trait]
    impl ScreenCapturer for XcapScreen {
        async fn capture(&self, region: &CaptureRegion) -> Result<RgbaImage> {
            let region = *region;
            tokio::task::spawn_blocking(move || capture_blocking(region))
                .await
                .context("Capture task panicked")?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displays() -> Vec<Display> {
        vec![
            Display {
                id: 1,
                frame: Rect::new(0.0, 0.0, 1440.0, 900.0),
                scale_factor: 2.0,
            },
            Display {
                id: 2,
                frame: Rect::new(1440.0, 0.0, 1920.0, 1080.0),
                scale_factor: 1.0,
            },
        ]
    }

    fn planner(origin: VerticalOrigin) -> CaptureRegionPlanner {
        CaptureRegionPlanner::new(Size::new(500.0, 140.0), origin)
    }

    #[test]
    fn test_region_is_centered_on_pointer() {
        let region = planner(VerticalOrigin::TopLeft)
            .plan(Point::new(700.0, 400.0), &displays())
            .unwrap();

        assert_eq!(region.display_id, 1);
        assert_eq!(region.rect, Rect::new(450.0, 330.0, 500.0, 140.0));
        assert_eq!(region.pixel_rect, Rect::new(900.0, 660.0, 1000.0, 280.0));
    }

    #[test]
    fn test_region_is_clipped_to_display() {
        let region = planner(VerticalOrigin::TopLeft)
            .plan(Point::new(100.0, 20.0), &displays())
            .unwrap();
        assert_eq!(region.rect, Rect::new(0.0, 0.0, 350.0, 90.0));
    }

    #[test]
    fn test_shared_edge_resolves_to_first_display() {
        let p = planner(VerticalOrigin::TopLeft);
        let displays = displays();
        assert_eq!(p.display_at(&displays, Point::new(1440.0, 500.0)).unwrap().id, 1);
        assert_eq!(p.display_at(&displays, Point::new(1440.5, 500.0)).unwrap().id, 2);
        assert!(p.plan(Point::new(-10.0, 10.0), &displays).is_none());
    }

    #[test]
    fn test_device_rect_is_local_and_flipped_for_bottom_left_capture() {
        let region = planner(VerticalOrigin::BottomLeft)
            .plan(Point::new(2000.0, 100.0), &displays())
            .unwrap();

        assert_eq!(region.display_id, 2);
        // UI rect spans y 30..170 on a 1080-high display
        assert_eq!(region.rect, Rect::new(1750.0, 30.0, 500.0, 140.0));
        assert_eq!(region.pixel_rect, Rect::new(310.0, 910.0, 500.0, 140.0));
    }

    #[test]
    fn test_normalized_point_and_back() {
        let region = planner(VerticalOrigin::TopLeft)
            .plan(Point::new(700.0, 400.0), &displays())
            .unwrap();

        assert_eq!(normalized_point(&region, Point::new(700.0, 400.0)), Point::new(0.5, 0.5));

        let word = Rect::new(0.1, 0.5, 0.2, 0.25);
        assert_eq!(to_screen(&region, &word), Rect::new(500.0, 400.0, 100.0, 35.0));
    }
}
