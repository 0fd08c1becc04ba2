use serde::{Deserialize, Serialize};

/// Per-clip transform, colour, audio and effect settings edited by the
/// properties panel. Values are stored clamped to the panel ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipProperties {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,

    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub hue: f64,

    pub volume: f64,
    pub fade_in: f64,
    pub fade_out: f64,

    pub blur: f64,
    pub sharpen: f64,
    pub vignette: f64,
}

impl Default for ClipProperties {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            scale_x: 100.0,
            scale_y: 100.0,
            opacity: 100.0,
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            hue: 0.0,
            volume: 100.0,
            fade_in: 0.0,
            fade_out: 0.0,
            blur: 0.0,
            sharpen: 0.0,
            vignette: 0.0,
        }
    }
}

/// Named colour looks offered next to the colour sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPreset {
    Warm,
    Cool,
    Vintage,
    BlackAndWhite,
}

impl ColorPreset {
    /// Writes the preset values onto `properties`. Black and white keeps the
    /// current brightness and hue.
    pub fn apply(self, properties: &mut ClipProperties) {
        match self {
            Self::Warm => {
                properties.brightness = 10.0;
                properties.contrast = 5.0;
                properties.saturation = 15.0;
                properties.hue = 10.0;
            }
            Self::Cool => {
                properties.brightness = -5.0;
                properties.contrast = 10.0;
                properties.saturation = 5.0;
                properties.hue = -15.0;
            }
            Self::Vintage => {
                properties.brightness = -10.0;
                properties.contrast = 20.0;
                properties.saturation = -20.0;
                properties.hue = 5.0;
            }
            Self::BlackAndWhite => {
                properties.saturation = -100.0;
                properties.contrast = 15.0;
            }
        }
    }
}

impl ClipProperties {
    /// Returns a copy with every value forced into its allowed range.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let fit = |value: f64, fallback: f64, min: f64, max: f64| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };
        let free = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };

        Self {
            x: free(self.x, defaults.x),
            y: free(self.y, defaults.y),
            width: fit(self.width, defaults.width, 0.0, f64::MAX),
            height: fit(self.height, defaults.height, 0.0, f64::MAX),
            rotation: fit(self.rotation, defaults.rotation, -180.0, 180.0),
            scale_x: free(self.scale_x, defaults.scale_x),
            scale_y: free(self.scale_y, defaults.scale_y),
            opacity: fit(self.opacity, defaults.opacity, 0.0, 100.0),
            brightness: fit(self.brightness, defaults.brightness, -100.0, 100.0),
            contrast: fit(self.contrast, defaults.contrast, -100.0, 100.0),
            saturation: fit(self.saturation, defaults.saturation, -100.0, 100.0),
            hue: fit(self.hue, defaults.hue, -180.0, 180.0),
            volume: fit(self.volume, defaults.volume, 0.0, 200.0),
            fade_in: fit(self.fade_in, defaults.fade_in, 0.0, f64::MAX),
            fade_out: fit(self.fade_out, defaults.fade_out, 0.0, f64::MAX),
            blur: fit(self.blur, defaults.blur, 0.0, 20.0),
            sharpen: fit(self.sharpen, defaults.sharpen, 0.0, 100.0),
            vignette: fit(self.vignette, defaults.vignette, 0.0, 100.0),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn flip_horizontal(&mut self) {
        self.scale_x = -self.scale_x;
    }

    pub fn flip_vertical(&mut self) {
        self.scale_y = -self.scale_y;
    }

    /// Rotates a quarter turn clockwise, wrapping back into `[-180, 180]`.
    pub fn rotate_90(&mut self) {
        let mut rotation = (self.rotation + 90.0) % 360.0;
        if rotation > 180.0 {
            rotation -= 360.0;
        }
        self.rotation = rotation;
    }
}
