/// Text shown when the comparison cannot be rendered
pub const FALLBACK_TEXT: &str = "Image not available";
pub const DEFAULT_POSITION: u8 = 50;

/// State of the original/heatmap wipe comparison.
///
/// Once an image fails to load the slider stays in fallback until the
/// component is remounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    position: u8,
    errored: bool,
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            errored: false,
        }
    }
}

/// What the slider should draw
#[derive(Debug, Clone, PartialEq)]
pub enum SliderView<'a> {
    Fallback,
    Compare {
        image_url: &'a str,
        heatmap_url: &'a str,
        position: u8,
    },
}

impl SliderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// Clamp into `[0, 100]`.
    pub fn set_position(&mut self, position: i64) {
        self.position = position.clamp(0, 100) as u8;
    }

    /// Parse the range input's string value; unparseable input is ignored.
    pub fn set_from_input(&mut self, raw: &str) {
        if let Ok(value) = raw.trim().parse::<f64>() {
            if value.is_finite() {
                self.set_position(value.round() as i64);
            }
        }
    }

    pub fn mark_errored(&mut self) {
        self.errored = true;
    }

    pub fn view<'a>(&self, image_url: Option<&'a str>, heatmap_url: Option<&'a str>) -> SliderView<'a> {
        match (self.errored, image_url, heatmap_url) {
            (false, Some(image_url), Some(heatmap_url)) if !image_url.is_empty() && !heatmap_url.is_empty() => {
                SliderView::Compare {
                    image_url,
                    heatmap_url,
                    position: self.position,
                }
            }
            _ => SliderView::Fallback,
        }
    }
}

/// CSS for the overlay layer: clipped to `position%` from the left.
pub fn overlay_style(position: u8) -> String {
    let position = position.min(100);
    format!("clip-path: inset(0 {}% 0 0);", 100 - position)
}

/// Track fill behind the range input thumb
pub fn track_style(position: u8) -> String {
    let position = position.min(100);
    format!(
        "background: linear-gradient(to right, #3AAFA9 0%, #3AAFA9 {p}%, rgba(255,255,255,0.3) {p}%, rgba(255,255,255,0.3) 100%);",
        p = position
    )
}
