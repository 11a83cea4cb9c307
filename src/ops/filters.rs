// ============================================================================
// IMAGE FILTERS — per-pixel channel transforms
// ============================================================================
//
// Every filter is a pure function of one pixel and an intensity.  Filters
// compose by threading the returned pixel into the next filter of a chain.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::pixels::Pixel;

/// Contrast stretch factor `259·(C+255) / (255·(259−C))` with `C` fixed at 20.
/// The filter's own intensity does not feed into it.
pub const CONTRAST_FACTOR: f32 = (259.0 * (20.0 + 255.0)) / (255.0 * (259.0 - 20.0));

/// Intensity used when a filter is built without one and its kind has no
/// default of its own (grayscale).
pub const BASE_INTENSITY: i32 = 20;

// Luma weights for the grayscale conversion.
const LUMA_RED: f32 = 0.2989;
const LUMA_GREEN: f32 = 0.5870;
const LUMA_BLUE: f32 = 0.1140;

/// Clamp an integer channel value into `0..=255`.
pub fn min_max_rgb(n: i32) -> u8 {
    n.clamp(0, 255) as u8
}

/// Clamp a float channel value into `0..=255`, truncating toward zero.
pub fn min_max_rgb_f(n: f32) -> u8 {
    n.clamp(0.0, 255.0) as u8
}

/// Filter variant without its parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    Contrast,
    Grayscale,
    Red,
    Green,
    Blue,
    Alpha,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Red,
        FilterKind::Green,
        FilterKind::Blue,
        FilterKind::Grayscale,
        FilterKind::Contrast,
        FilterKind::Alpha,
    ];

    pub fn default_intensity(self) -> i32 {
        match self {
            FilterKind::Contrast => 190,
            FilterKind::Grayscale => BASE_INTENSITY,
            FilterKind::Red => 25,
            FilterKind::Green => 255,
            FilterKind::Blue => 145,
            FilterKind::Alpha => 15,
        }
    }

    /// Registry key for this kind.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Contrast => "contrast",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Red => "red",
            FilterKind::Green => "green",
            FilterKind::Blue => "blue",
            FilterKind::Alpha => "alpha",
        }
    }

    /// Case-sensitive lookup by registry key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One image filter together with its adjustable intensity.
///
/// Intensity is nominally `0..=255` but is never validated; filters that use
/// it clamp the resulting channel value instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    Contrast { intensity: i32 },
    Grayscale { intensity: i32 },
    Red { intensity: i32 },
    Green { intensity: i32 },
    Blue { intensity: i32 },
    Alpha { intensity: i32 },
}

impl Filter {
    /// Filter of the given kind at its default intensity.
    pub fn new(kind: FilterKind) -> Self {
        Self::with_intensity(kind, kind.default_intensity())
    }

    pub fn with_intensity(kind: FilterKind, intensity: i32) -> Self {
        match kind {
            FilterKind::Contrast => Filter::Contrast { intensity },
            FilterKind::Grayscale => Filter::Grayscale { intensity },
            FilterKind::Red => Filter::Red { intensity },
            FilterKind::Green => Filter::Green { intensity },
            FilterKind::Blue => Filter::Blue { intensity },
            FilterKind::Alpha => Filter::Alpha { intensity },
        }
    }

    pub fn contrast() -> Self {
        Self::new(FilterKind::Contrast)
    }

    pub fn grayscale() -> Self {
        Self::new(FilterKind::Grayscale)
    }

    pub fn red(intensity: i32) -> Self {
        Filter::Red { intensity }
    }

    pub fn green(intensity: i32) -> Self {
        Filter::Green { intensity }
    }

    pub fn blue(intensity: i32) -> Self {
        Filter::Blue { intensity }
    }

    pub fn alpha(intensity: i32) -> Self {
        Filter::Alpha { intensity }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Contrast { .. } => FilterKind::Contrast,
            Filter::Grayscale { .. } => FilterKind::Grayscale,
            Filter::Red { .. } => FilterKind::Red,
            Filter::Green { .. } => FilterKind::Green,
            Filter::Blue { .. } => FilterKind::Blue,
            Filter::Alpha { .. } => FilterKind::Alpha,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn intensity(&self) -> i32 {
        match *self {
            Filter::Contrast { intensity }
            | Filter::Grayscale { intensity }
            | Filter::Red { intensity }
            | Filter::Green { intensity }
            | Filter::Blue { intensity }
            | Filter::Alpha { intensity } => intensity,
        }
    }

    pub fn set_intensity(&mut self, value: i32) {
        match self {
            Filter::Contrast { intensity }
            | Filter::Grayscale { intensity }
            | Filter::Red { intensity }
            | Filter::Green { intensity }
            | Filter::Blue { intensity }
            | Filter::Alpha { intensity } => *intensity = value,
        }
    }

    /// Intensity as a fraction of 100 (slider scale).
    pub fn intensity_percent(&self) -> f64 {
        self.intensity() as f64 / 100.0
    }

    /// Store a slider value as the new intensity.  The value is truncated,
    /// not rescaled.
    pub fn set_intensity_percent(&mut self, value: f64) {
        self.set_intensity(value as i32);
    }

    /// Transform `pixel` using `intensity`.  Callers normally pass
    /// [`Filter::intensity`], but any value is accepted.
    pub fn apply(&self, pixel: Pixel, intensity: i32) -> Pixel {
        match self {
            Filter::Contrast { .. } => Pixel {
                red: stretch(pixel.red),
                green: stretch(pixel.green),
                blue: stretch(pixel.blue),
                alpha: pixel.alpha,
            },
            Filter::Grayscale { .. } => {
                // Each weighted term is clamped on its own and the sum wraps
                // at 8 bits.
                let r = min_max_rgb_f(pixel.red as f32 * LUMA_RED);
                let b = min_max_rgb_f(pixel.blue as f32 * LUMA_BLUE);
                let g = min_max_rgb_f(pixel.green as f32 * LUMA_GREEN);
                let gray = r.wrapping_add(b).wrapping_add(g);
                Pixel { red: gray, green: gray, blue: gray, alpha: pixel.alpha }
            }
            Filter::Red { .. } => Pixel { red: min_max_rgb(intensity), ..pixel },
            Filter::Green { .. } => Pixel { green: min_max_rgb(intensity), ..pixel },
            Filter::Blue { .. } => Pixel { blue: min_max_rgb(intensity), ..pixel },
            Filter::Alpha { .. } => Pixel { alpha: min_max_rgb(intensity), ..pixel },
        }
    }

    /// Transform `pixel` with this filter's own intensity.
    pub fn apply_own(&self, pixel: Pixel) -> Pixel {
        self.apply(pixel, self.intensity())
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name(), self.intensity())
    }
}

fn stretch(channel: u8) -> u8 {
    min_max_rgb_f(CONTRAST_FACTOR * (channel as i32 - 128) as f32 + 128.0)
}

/// Run `pixel` through every filter of `chain`, in order.
pub fn apply_chain(chain: &[Filter], pixel: Pixel) -> Pixel {
    chain.iter().fold(pixel, |px, filter| filter.apply_own(px))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Pixel = Pixel::new(10, 200, 30, 255);

    #[test]
    fn clamp_is_idempotent() {
        for n in [-300, -1, 0, 17, 128, 255, 256, 9000] {
            let once = min_max_rgb(n);
            assert_eq!(min_max_rgb(once as i32), once);
        }
        for n in [-4.5f32, 0.0, 12.9, 254.99, 255.0, 1e6] {
            let once = min_max_rgb_f(n);
            assert_eq!(min_max_rgb_f(once as f32), once);
        }
        assert_eq!(min_max_rgb_f(12.9), 12);
    }

    #[test]
    fn defaults_match_kinds() {
        assert_eq!(Filter::contrast().intensity(), 190);
        assert_eq!(Filter::grayscale().intensity(), 20);
        assert_eq!(Filter::new(FilterKind::Red).intensity(), 25);
        assert_eq!(Filter::new(FilterKind::Green).intensity(), 255);
        assert_eq!(Filter::new(FilterKind::Blue).intensity(), 145);
        assert_eq!(Filter::new(FilterKind::Alpha).intensity(), 15);
    }

    #[test]
    fn channel_filters_touch_only_their_channel() {
        assert_eq!(Filter::red(255).apply_own(SAMPLE), Pixel::new(255, 200, 30, 255));
        assert_eq!(Filter::green(7).apply_own(SAMPLE), Pixel::new(10, 7, 30, 255));
        assert_eq!(Filter::blue(99).apply_own(SAMPLE), Pixel::new(10, 200, 99, 255));
        assert_eq!(Filter::alpha(0).apply_own(SAMPLE), Pixel::new(10, 200, 30, 0));
    }

    #[test]
    fn out_of_range_intensity_is_clamped() {
        assert_eq!(Filter::red(1000).apply_own(SAMPLE).red, 255);
        assert_eq!(Filter::blue(-40).apply_own(SAMPLE).blue, 0);
    }

    #[test]
    fn explicit_intensity_overrides_own() {
        let f = Filter::alpha(15);
        assert_eq!(f.apply(SAMPLE, 100).alpha, 100);
    }

    #[test]
    fn grayscale_equalizes_rgb_and_keeps_alpha() {
        let out = Filter::grayscale().apply_own(Pixel::new(100, 50, 200, 77));
        assert_eq!(out.red, out.green);
        assert_eq!(out.green, out.blue);
        assert_eq!(out.alpha, 77);
        // 29 + 22 + 29
        assert_eq!(out.red, 80);
    }

    #[test]
    fn grayscale_white_stays_below_overflow() {
        let out = Filter::grayscale().apply_own(Pixel::new(255, 255, 255, 255));
        assert_eq!(out, Pixel::new(254, 254, 254, 255));
    }

    #[test]
    fn contrast_ignores_intensity() {
        assert!((CONTRAST_FACTOR - 1.168_676_7).abs() < 1e-5);
        let px = Pixel::new(200, 50, 0, 9);
        let expected = Pixel::new(212, 36, 0, 9);
        assert_eq!(Filter::contrast().apply_own(px), expected);
        assert_eq!(Filter::Contrast { intensity: 0 }.apply_own(px), expected);
    }

    #[test]
    fn contrast_leaves_neutral_gray() {
        let gray = Pixel::new(128, 128, 128, 255);
        assert_eq!(Filter::contrast().apply_own(gray), gray);
    }

    #[test]
    fn chain_order_matters() {
        let red_then_gray = apply_chain(&[Filter::red(255), Filter::grayscale()], SAMPLE);
        let gray_then_red = apply_chain(&[Filter::grayscale(), Filter::red(255)], SAMPLE);
        assert_eq!(red_then_gray, Pixel::new(196, 196, 196, 255));
        assert_eq!(gray_then_red, Pixel::new(255, 122, 122, 255));
    }

    #[test]
    fn intensity_percent_round_trip() {
        let mut f = Filter::blue(145);
        assert!((f.intensity_percent() - 1.45).abs() < 1e-9);
        f.set_intensity_percent(42.9);
        assert_eq!(f.intensity(), 42);
        assert_eq!(f.kind(), FilterKind::Blue);
    }

    #[test]
    fn kind_names_are_lowercase_keys() {
        for kind in FilterKind::ALL {
            assert_eq!(FilterKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FilterKind::from_name("Red"), None);
        assert_eq!(Filter::green(3).to_string(), "green=3");
    }
}
