use crate::config::{ALPHA_FALLOFF_OFFSET, PERSPECTIVE_FACTOR};

/// Perspective scale for a point at the given depth in front of the camera.
/// The constant term in the denominator keeps the result finite at depth 0.
pub fn perspective_scale(depth: f64) -> f64 {
    1.0 / (depth * PERSPECTIVE_FACTOR + 1.0)
}

/// Projects a perspective scale onto a screen y-coordinate between the
/// horizon and the bottom edge of the canvas.
pub fn perspective_y(horizon_y: f64, canvas_height: f64, scale: f64) -> f64 {
    horizon_y + (canvas_height - horizon_y) * scale
}

/// Stroke-width multiplier simulating anisotropic blur at distance.
/// Never drops below 1 so nearby lines keep their configured width.
pub fn anisotropic_factor(blur: f64, amount: f64, multiplier: f64) -> f64 {
    (blur * amount * multiplier).max(1.0)
}

/// Opacity of a depth line: fades with distance, clamped to [0, 1].
pub fn depth_opacity(depth: f64, depth_limit: f64) -> f64 {
    (1.0 - depth / depth_limit + ALPHA_FALLOFF_OFFSET).clamp(0.0, 1.0)
}

/// Opacity of a vertical line at a lateral distance from center.
pub fn lateral_opacity(distance: f64, half_width: f64) -> f64 {
    (1.0 - distance / half_width + ALPHA_FALLOFF_OFFSET).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_decreases_with_depth() {
        let mut previous = perspective_scale(0.0);
        assert!((previous - 1.0).abs() < 1e-12);
        for z in 1..200 {
            let scale = perspective_scale(z as f64 * 1000.0);
            assert!(scale < previous, "scale must shrink as depth grows");
            assert!(scale > 0.0);
            previous = scale;
        }
    }

    #[test]
    fn projected_y_approaches_horizon() {
        let horizon_y = 304.0;
        let canvas_h = 800.0;
        let near = perspective_y(horizon_y, canvas_h, perspective_scale(0.0));
        assert!((near - canvas_h).abs() < 1e-9, "depth 0 projects to the bottom edge");
        let mut previous = near;
        for z in 1..500 {
            let y = perspective_y(horizon_y, canvas_h, perspective_scale(z as f64 * 1000.0));
            assert!(y < previous);
            assert!(y > horizon_y);
            previous = y;
        }
        let far = perspective_y(horizon_y, canvas_h, perspective_scale(1e12));
        assert!(far - horizon_y < 1e-3);
    }

    #[test]
    fn opacity_clamps() {
        let limit = 200.0 * 1000.0;
        assert!((depth_opacity(0.0, limit) - 1.0).abs() < 1e-12);
        assert!(depth_opacity(limit, limit) > 0.0);
        assert_eq!(depth_opacity(limit * 10.0, limit), 0.0);
        assert_eq!(lateral_opacity(0.0, 100.0), 1.0);
        assert_eq!(lateral_opacity(1e6, 100.0), 0.0);
    }

    #[test]
    fn anisotropic_factor_floors_at_one() {
        assert_eq!(anisotropic_factor(0.01, 0.0, 0.01), 1.0);
        assert_eq!(anisotropic_factor(0.01, 100.0, 0.01), 1.0);
        let far = anisotropic_factor(0.01, 200_000.0, 0.01);
        assert!(far > 1.0);
    }
}
