use std::fmt;
use std::str::FromStr;

use crate::coords::{FrameSize, ViewportSize};

use super::abi::ViewportUniform;

/// How the native frame is fitted onto the drawable surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ScalingPolicy {
    /// Fill the surface; aspect ratio follows the window.
    Stretch,
    /// Largest uniform scale that fits; the remainder is cleared (letterbox or
    /// pillarbox).
    #[default]
    Letterbox,
    /// Largest whole-number uniform scale that fits. Falls back to `Letterbox`
    /// when the surface is smaller than the native frame.
    IntegerScale,
}

impl ScalingPolicy {
    /// Native-pixel to surface-pixel scale per axis.
    ///
    /// Zero-area inputs yield `[0.0, 0.0]`, which collapses the quad.
    pub fn scale(self, native: FrameSize, viewport: ViewportSize) -> [f32; 2] {
        if native.is_empty() || viewport.is_empty() {
            return [0.0, 0.0];
        }

        let sx = viewport.width as f32 / native.width as f32;
        let sy = viewport.height as f32 / native.height as f32;

        match self {
            ScalingPolicy::Stretch => [sx, sy],
            ScalingPolicy::Letterbox => {
                let s = sx.min(sy);
                [s, s]
            }
            ScalingPolicy::IntegerScale => {
                let fit = sx.min(sy);
                let s = if fit >= 1.0 { fit.floor() } else { fit };
                [s, s]
            }
        }
    }

    /// Size of the drawn image on the surface, in physical pixels.
    pub fn presented_extent(self, native: FrameSize, viewport: ViewportSize) -> [f32; 2] {
        let [sx, sy] = self.scale(native, viewport);
        [native.width as f32 * sx, native.height as f32 * sy]
    }

    /// Uniform contents for the vertex stage.
    pub fn uniform(self, native: FrameSize, viewport: ViewportSize) -> ViewportUniform {
        ViewportUniform {
            size: viewport.as_f32(),
            scale: self.scale(native, viewport),
        }
    }
}

impl FromStr for ScalingPolicy {
    type Err = UnknownScalingPolicy;

    /// Accepts `stretch`, `letterbox` (or `fit`) and `integer`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stretch" => Ok(Self::Stretch),
            "letterbox" | "fit" => Ok(Self::Letterbox),
            "integer" => Ok(Self::IntegerScale),
            _ => Err(UnknownScalingPolicy(s.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized [`ScalingPolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScalingPolicy(pub String);

impl fmt::Display for UnknownScalingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scaling policy `{}` (expected stretch, letterbox or integer)",
            self.0
        )
    }
}

impl std::error::Error for UnknownScalingPolicy {}

#[cfg(test)]
mod tests {
    use super::*;

    const DMG: FrameSize = FrameSize::DMG;

    #[test]
    fn stretch_fills_both_axes() {
        let v = ViewportSize::new(800, 300);
        assert_eq!(ScalingPolicy::Stretch.presented_extent(DMG, v), [800.0, 300.0]);
    }

    #[test]
    fn letterbox_on_wide_surface_pillarboxes() {
        // Height is the limiting axis: 288 / 144 = 2.
        let v = ViewportSize::new(1000, 288);
        assert_eq!(ScalingPolicy::Letterbox.scale(DMG, v), [2.0, 2.0]);
        assert_eq!(ScalingPolicy::Letterbox.presented_extent(DMG, v), [320.0, 288.0]);
    }

    #[test]
    fn letterbox_on_tall_surface_letterboxes() {
        let v = ViewportSize::new(320, 1000);
        assert_eq!(ScalingPolicy::Letterbox.presented_extent(DMG, v), [320.0, 288.0]);
    }

    #[test]
    fn letterbox_exact_multiple_fills_surface() {
        let v = ViewportSize::new(480, 432);
        assert_eq!(ScalingPolicy::Letterbox.presented_extent(DMG, v), [480.0, 432.0]);
    }

    #[test]
    fn integer_scale_rounds_down() {
        // Fit would be 2.5; integer policy keeps 2.
        let v = ViewportSize::new(400, 400);
        assert_eq!(ScalingPolicy::IntegerScale.scale(DMG, v), [2.0, 2.0]);
    }

    #[test]
    fn integer_scale_below_native_falls_back_to_fit() {
        let v = ViewportSize::new(80, 72);
        assert_eq!(ScalingPolicy::IntegerScale.scale(DMG, v), [0.5, 0.5]);
    }

    #[test]
    fn zero_viewport_collapses_quad() {
        for policy in [
            ScalingPolicy::Stretch,
            ScalingPolicy::Letterbox,
            ScalingPolicy::IntegerScale,
        ] {
            let u = policy.uniform(DMG, ViewportSize::new(0, 0));
            assert_eq!(u.size, [0.0, 0.0]);
            assert_eq!(u.scale, [0.0, 0.0]);
        }
    }

    #[test]
    fn default_policy_preserves_aspect() {
        assert_eq!(ScalingPolicy::default(), ScalingPolicy::Letterbox);
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("Stretch".parse(), Ok(ScalingPolicy::Stretch));
        assert_eq!(" fit ".parse(), Ok(ScalingPolicy::Letterbox));
        assert_eq!("integer".parse(), Ok(ScalingPolicy::IntegerScale));
        assert!("zoom".parse::<ScalingPolicy>().is_err());
    }
}
