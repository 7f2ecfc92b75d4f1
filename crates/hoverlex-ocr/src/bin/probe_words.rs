//! Capture around a screen point and print the words found there.
//!
//! cargo run -p hoverlex-ocr --features xcap,windows-ocr --bin probe_words -- 640 360

use anyhow::{Context, Result};
use hoverlex_config::capture::CaptureConfig;
use hoverlex_ocr::{CaptureRegionPlanner, DisplaySource, ScreenCapturer, XcapScreen};
use hoverlex_types::Point;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let x: f64 = args.next().context("usage: probe_words <x> <y>")?.parse()?;
    let y: f64 = args.next().context("usage: probe_words <x> <y>")?.parse()?;
    let pointer = Point::new(x, y);

    let screen = XcapScreen;
    let displays = screen.displays()?;
    for display in &displays {
        println!("display {} {:?} @{}x", display.id, display.frame, display.scale_factor);
    }

    let planner = CaptureRegionPlanner::from_config(&CaptureConfig::default());
    let region = planner
        .plan(pointer, &displays)
        .context("Point is not on any display")?;
    println!("region {:?} -> pixels {:?}", region.rect, region.pixel_rect);

    let start = std::time::Instant::now();
    let image = screen.capture(&region).await?;
    println!("captured {}x{} in {:?}", image.width(), image.height(), start.elapsed());
    image.save("probe_capture.png")?;

    #[cfg(all(windows, feature = "windows-ocr"))]
    {
        use hoverlex_ocr::{TextRecognizer, WindowsOcrRecognizer, WordSegmenter, WordSelector};

        let lines = WindowsOcrRecognizer.recognize(&image, "en")?;
        let words = WordSegmenter::default().segment(&lines);
        for word in &words {
            println!("  {:<20} {:?}", word.text, word.bounding_box);
        }

        let point = hoverlex_ocr::normalized_point(&region, pointer);
        match WordSelector::default().select(&words, point) {
            Some(word) => println!("under pointer: {}", word.text),
            None => println!("no word under pointer"),
        }
    }

    Ok(())
}
