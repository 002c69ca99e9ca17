//! Image size buckets for illustration requests.
//!
//! The image provider only accepts a handful of sizes. The caller reports
//! its viewport aspect ratio and gets the nearest supported bucket.

use serde::{Deserialize, Serialize};

/// Aspect ratio assumed when the caller does not report one.
pub const DEFAULT_ASPECT_RATIO: f64 = 1.0;

/// Supported output sizes, widest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    /// 1024x576 (16:9).
    UltraWideLandscape,
    /// 1024x683 (3:2).
    WideLandscape,
    /// 1024x768 (4:3).
    StandardLandscape,
    /// 1024x1024.
    Square,
    /// 819x1024 (4:5).
    StandardPortrait,
    /// 768x1024 (3:4).
    Portrait,
    /// 576x1024 (9:16).
    TallPortrait,
}

impl ImageSize {
    pub const ALL: [ImageSize; 7] = [
        Self::UltraWideLandscape,
        Self::WideLandscape,
        Self::StandardLandscape,
        Self::Square,
        Self::StandardPortrait,
        Self::Portrait,
        Self::TallPortrait,
    ];

    /// Pick the bucket for a viewport aspect ratio (`width / height`).
    ///
    /// Boundary values belong to the wider bucket for landscape (`>= 1.9`,
    /// `>= 1.5`) and to the taller bucket for portrait (`<= 0.6`, `<= 0.75`).
    /// Missing, non-finite or non-positive ratios fall back to
    /// [`DEFAULT_ASPECT_RATIO`].
    pub fn for_aspect_ratio(aspect_ratio: Option<f64>) -> Self {
        let ratio = aspect_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_ASPECT_RATIO);

        if ratio >= 1.9 {
            Self::UltraWideLandscape
        } else if ratio >= 1.5 {
            Self::WideLandscape
        } else if ratio > 1.0 {
            Self::StandardLandscape
        } else if ratio <= 0.6 {
            Self::TallPortrait
        } else if ratio <= 0.75 {
            Self::Portrait
        } else if ratio < 1.0 {
            Self::StandardPortrait
        } else {
            Self::Square
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::UltraWideLandscape => (1024, 576),
            Self::WideLandscape => (1024, 683),
            Self::StandardLandscape => (1024, 768),
            Self::Square => (1024, 1024),
            Self::StandardPortrait => (819, 1024),
            Self::Portrait => (768, 1024),
            Self::TallPortrait => (576, 1024),
        }
    }

    /// `"WIDTHxHEIGHT"`, the form the front-end and logs use.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UltraWideLandscape => "1024x576",
            Self::WideLandscape => "1024x683",
            Self::StandardLandscape => "1024x768",
            Self::Square => "1024x1024",
            Self::StandardPortrait => "819x1024",
            Self::Portrait => "768x1024",
            Self::TallPortrait => "576x1024",
        }
    }

    /// Ratio label accepted by aspect-ratio based image models.
    pub fn ratio_label(self) -> &'static str {
        match self {
            Self::UltraWideLandscape => "16:9",
            Self::WideLandscape => "3:2",
            Self::StandardLandscape => "4:3",
            Self::Square => "1:1",
            Self::StandardPortrait => "4:5",
            Self::Portrait => "3:4",
            Self::TallPortrait => "9:16",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn size(ratio: f64) -> ImageSize {
        ImageSize::for_aspect_ratio(Some(ratio))
    }

    #[test]
    fn documented_table() {
        let cases = [
            (1.0, ImageSize::Square),
            (1.9, ImageSize::UltraWideLandscape),
            (1.5, ImageSize::WideLandscape),
            (1.2, ImageSize::StandardLandscape),
            (0.6, ImageSize::TallPortrait),
            (0.75, ImageSize::Portrait),
            (0.8, ImageSize::StandardPortrait),
        ];
        for (ratio, expected) in cases {
            assert_eq!(size(ratio), expected, "ratio {ratio}");
        }
    }

    #[test]
    fn just_below_boundaries_fall_to_next_bucket() {
        assert_eq!(size(1.899), ImageSize::WideLandscape);
        assert_eq!(size(1.499), ImageSize::StandardLandscape);
        assert_eq!(size(0.601), ImageSize::Portrait);
        assert_eq!(size(0.751), ImageSize::StandardPortrait);
    }

    #[test]
    fn unknown_ratio_is_square() {
        assert_eq!(ImageSize::for_aspect_ratio(None), ImageSize::Square);
        assert_eq!(size(f64::NAN), ImageSize::Square);
        assert_eq!(size(0.0), ImageSize::Square);
        assert_eq!(size(-2.0), ImageSize::Square);
    }

    #[test]
    fn labels_match_dimensions() {
        for size in ImageSize::ALL {
            let (w, h) = size.dimensions();
            assert_eq!(size.as_str(), format!("{w}x{h}"));
        }
    }
}
