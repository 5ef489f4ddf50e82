//! Image Compaction
//!
//! Lossy downsizing of self-contained encoded images (data URLs) so they
//! fit in local storage. Compaction never fails from the caller's point of
//! view: any problem yields the input unchanged.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ExtendedColorType;

/// Target size and quality for one kind of image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactionProfile {
    pub max_width_px: u32,
    /// Lossy quality in `0.0..=1.0`
    pub quality: f32,
}

impl CompactionProfile {
    /// Generated artifacts
    pub const ARTIFACT: Self = Self {
        max_width_px: 800,
        quality: 0.7,
    };

    /// Input thumbnails
    pub const PREVIEW: Self = Self {
        max_width_px: 200,
        quality: 0.5,
    };

    pub fn new(max_width_px: u32, quality: f32) -> Self {
        Self {
            max_width_px,
            quality,
        }
    }

    /// Quality as a JPEG quality factor (1-100)
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Image compaction trait
#[trait_variant::make(ImageCompactor: Send)]
pub trait LocalImageCompactor {
    /// Compact `image_data`; resolves to the input unchanged on any failure
    async fn compact(&self, image_data: &str, profile: CompactionProfile) -> String;
}

/// Leaves images untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCompactor;

impl ImageCompactor for PassthroughCompactor {
    async fn compact(&self, image_data: &str, _profile: CompactionProfile) -> String {
        image_data.to_string()
    }
}

/// Re-encodes data-URL images as scaled-down JPEG on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCompactor;

impl ImageCompactor for JpegCompactor {
    async fn compact(&self, image_data: &str, profile: CompactionProfile) -> String {
        let input = image_data.to_string();
        match tokio::task::spawn_blocking(move || compact_data_url(&input, profile)).await {
            Ok(Ok(compacted)) => {
                tracing::debug!(
                    before = image_data.len(),
                    after = compacted.len(),
                    max_width = profile.max_width_px,
                    "Image compacted"
                );
                compacted
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Image left uncompacted");
                image_data.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image compaction task failed");
                image_data.to_string()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompactionError {
    #[error("Not an image data URL")]
    NotAnImage,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode, scale to `profile.max_width_px` and re-encode as a JPEG data URL
///
/// Accepts `data:image/<type>;base64,<payload>` or bare base64.
pub fn compact_data_url(data: &str, profile: CompactionProfile) -> Result<String, CompactionError> {
    let payload = base64_payload(data)?;
    let bytes = STANDARD.decode(payload.trim())?;
    let img = image::load_from_memory(&bytes)?;

    let img = if img.width() > profile.max_width_px {
        let height = (u64::from(img.height()) * u64::from(profile.max_width_px)
            / u64::from(img.width()))
        .max(1) as u32;
        img.resize_exact(profile.max_width_px, height, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, profile.jpeg_quality()).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&encoded)))
}

fn base64_payload(data: &str) -> Result<&str, CompactionError> {
    let Some(rest) = data.strip_prefix("data:") else {
        return Ok(data);
    };
    let (meta, payload) = rest.split_once(',').ok_or(CompactionError::NotAnImage)?;
    if meta.starts_with("image/") && meta.ends_with(";base64") {
        Ok(payload)
    } else {
        Err(CompactionError::NotAnImage)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CompactionError, CompactionProfile, ImageCompactor, JpegCompactor, PassthroughCompactor,
        STANDARD, compact_data_url,
    };
    use base64::Engine;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    /// PNG data URL filled with pseudo-random pixels
    fn noisy_png_data_url(width: u32, height: u32) -> String {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let img = ImageBuffer::from_fn(width, height, |_, _| {
            let mut channel = || {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 56) as u8
            };
            Rgb([channel(), channel(), channel()])
        });
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(&png))
    }

    fn decode_dimensions(data_url: &str) -> (u32, u32) {
        let payload = data_url.strip_prefix("data:image/jpeg;base64,").unwrap();
        let img = image::load_from_memory(&STANDARD.decode(payload).unwrap()).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_profiles() {
        assert_eq!(CompactionProfile::ARTIFACT.max_width_px, 800);
        assert_eq!(CompactionProfile::ARTIFACT.jpeg_quality(), 70);
        assert_eq!(CompactionProfile::PREVIEW.max_width_px, 200);
        assert_eq!(CompactionProfile::PREVIEW.jpeg_quality(), 50);
        assert_eq!(CompactionProfile::new(10, 0.0).jpeg_quality(), 1);
        assert_eq!(CompactionProfile::new(10, 3.0).jpeg_quality(), 100);
    }

    #[test]
    fn test_wide_image_is_scaled_down() {
        let input = noisy_png_data_url(1000, 500);
        let output = compact_data_url(&input, CompactionProfile::ARTIFACT).unwrap();

        assert!(output.starts_with("data:image/jpeg;base64,"));
        assert!(output.len() < input.len());
        assert_eq!(decode_dimensions(&output), (800, 400));
    }

    #[test]
    fn test_narrow_image_keeps_size() {
        let input = noisy_png_data_url(120, 80);
        let output = compact_data_url(&input, CompactionProfile::PREVIEW).unwrap();
        assert_eq!(decode_dimensions(&output), (120, 80));
    }

    #[test]
    fn test_bare_base64_is_accepted() {
        let input = noisy_png_data_url(40, 40);
        let bare = input.strip_prefix("data:image/png;base64,").unwrap();
        assert!(compact_data_url(bare, CompactionProfile::PREVIEW).is_ok());
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            compact_data_url("data:text/plain;base64,aGVsbG8=", CompactionProfile::ARTIFACT),
            Err(CompactionError::NotAnImage)
        ));
        assert!(matches!(
            compact_data_url("%%%not base64%%%", CompactionProfile::ARTIFACT),
            Err(CompactionError::Base64(_))
        ));
        assert!(matches!(
            compact_data_url("aGVsbG8=", CompactionProfile::ARTIFACT),
            Err(CompactionError::Image(_))
        ));
    }

    #[tokio::test]
    async fn test_jpeg_compactor_falls_back_to_input() {
        let garbage = "definitely not an image";
        let output = JpegCompactor
            .compact(garbage, CompactionProfile::ARTIFACT)
            .await;
        assert_eq!(output, garbage);
    }

    #[tokio::test]
    async fn test_jpeg_compactor_compacts() {
        let input = noisy_png_data_url(400, 300);
        let output = JpegCompactor.compact(&input, CompactionProfile::PREVIEW).await;
        assert_eq!(decode_dimensions(&output), (200, 150));
    }

    #[tokio::test]
    async fn test_passthrough() {
        let output = PassthroughCompactor
            .compact("data:image/png;base64,AAAA", CompactionProfile::ARTIFACT)
            .await;
        assert_eq!(output, "data:image/png;base64,AAAA");
    }
}
