use anyhow::Result;
use hoverlex_types::{LineSegment, Rect};
use image::RgbaImage;

pub use hoverlex_types::RecognizedLine;

/// Text recognition over a captured image.
///
/// Implementations are blocking; callers run them on a blocking thread.
pub trait TextRecognizer: Send + Sync {
    /// Lines found in `image`, boxes normalized to the image with origin
    /// top-left. `language` is a BCP-47 hint.
    fn recognize(&self, image: &RgbaImage, language: &str) -> Result<Vec<RecognizedLine>>;
}

/// Attach recognizer word boxes to a line as character-range segments.
///
/// Words are matched left to right against `line_text`. A word that cannot
/// be found after the previous match is skipped.
pub fn locate_segments<'a>(
    line_text: &str,
    words: impl IntoIterator<Item = (&'a str, Rect)>,
) -> Vec<LineSegment> {
    let chars: Vec<char> = line_text.chars().collect();
    let mut cursor = 0;
    let mut segments = Vec::new();

    for (word, bounding_box) in words {
        let needle: Vec<char> = word.chars().collect();
        if needle.is_empty() || needle.len() > chars.len() {
            continue;
        }

        let found = (cursor..=chars.len() - needle.len())
            .find(|&start| chars[start..start + needle.len()] == needle[..]);

        if let Some(start) = found {
            let end = start + needle.len();
            segments.push(LineSegment {
                range: start..end,
                bounding_box,
            });
            cursor = end;
        }
    }

    segments
}

#[cfg(all(windows, feature = "windows-ocr"))]
pub use self::windows_backend::WindowsOcrRecognizer;

#[cfg(all(windows, feature = "windows-ocr"))]
mod windows_backend {
    use anyhow::{Context, Result};
    use hoverlex_types::{RecognizedLine, Rect};
    use image::{ImageEncoder, RgbaImage};
    use windows::{
        Globalization::Language,
        Graphics::Imaging::BitmapDecoder,
        Media::Ocr::OcrEngine,
        Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
        core::HSTRING,
    };

    use super::{TextRecognizer, locate_segments};
    use crate::com::ComGuard;

    /// Recognizer backed by `Windows.Media.Ocr`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WindowsOcrRecognizer;

    fn engine_for(language: &str) -> Result<OcrEngine> {
        let language = Language::CreateLanguage(&HSTRING::from(language))
            .context("Failed to create language")?;
        match OcrEngine::TryCreateFromLanguage(&language) {
            Ok(engine) => Ok(engine),
            Err(_) => OcrEngine::TryCreateFromUserProfileLanguages()
                .context("No OCR engine for language or user profile"),
        }
    }

    fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .context("Failed to encode PNG")?;
        Ok(buffer)
    }

    fn normalize(rect: windows::Foundation::Rect, width: f64, height: f64) -> Rect {
        Rect::new(
            f64::from(rect.X) / width,
            f64::from(rect.Y) / height,
            f64::from(rect.Width) / width,
            f64::from(rect.Height) / height,
        )
    }

    impl TextRecognizer for WindowsOcrRecognizer {
        fn recognize(&self, image: &RgbaImage, language: &str) -> Result<Vec<RecognizedLine>> {
            let _com = ComGuard::initialize()?;
            let engine = engine_for(language)?;

            let stream = InMemoryRandomAccessStream::new().context("Failed to create stream")?;
            let writer =
                DataWriter::CreateDataWriter(&stream).context("Failed to create writer")?;
            writer
                .WriteBytes(&encode_png(image)?)
                .context("Failed to write image bytes")?;
            writer
                .StoreAsync()
                .context("Failed to store async")?
                .get()
                .context("Failed to store data")?;
            writer.FlushAsync().context("Failed to flush")?.get()?;
            stream.Seek(0).context("Failed to seek")?;

            let bitmap = BitmapDecoder::CreateAsync(&stream)
                .context("Failed to create decoder async")?
                .get()
                .context("Failed to get decoder")?
                .GetSoftwareBitmapAsync()
                .context("Failed to get bitmap async")?
                .get()
                .context("Failed to get software bitmap")?;

            let result = engine
                .RecognizeAsync(&bitmap)
                .context("Failed to recognize async")?
                .get()
                .context("Failed to get OCR result")?;

            let (width, height) = (f64::from(image.width()), f64::from(image.height()));
            let mut lines = Vec::new();

            for line in result.Lines()? {
                let text = line.Text()?.to_string();

                let mut words = Vec::new();
                for word in line.Words()? {
                    words.push((word.Text()?.to_string(), normalize(word.BoundingRect()?, width, height)));
                }

                let Some(bounding_box) = words
                    .iter()
                    .map(|(_, b)| *b)
                    .reduce(|acc, b| acc.union(&b))
                else {
                    continue;
                };

                let segments = locate_segments(&text, words.iter().map(|(t, b)| (t.as_str(), *b)));
                lines.push(RecognizedLine::new(text, bounding_box).with_segments(segments));
            }

            tracing::debug!("[OCR] Recognized {} line(s)", lines.len());
            Ok(lines)
        }
    }
}
