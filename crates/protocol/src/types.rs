use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. `x`/`y` is the top-left corner; `y` grows downward.
///
/// Used both for normalized data-space regions (columns × span fractions)
/// and for window/pixel regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rect from its top-left and bottom-right corners.
    pub fn from_corners(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Same region with non-negative width and height.
    pub fn normalized(&self) -> Self {
        Self::from_corners(
            self.left().min(self.right()),
            self.top().min(self.bottom()),
            self.left().max(self.right()),
            self.top().max(self.bottom()),
        )
    }

    /// Edges included.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Linear interpolation of the two corners, `t` in `[0, 1]`.
    pub fn lerp(&self, to: &Rect, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::from_corners(
            mix(self.left(), to.left()),
            mix(self.top(), to.top()),
            mix(self.right(), to.right()),
            mix(self.bottom(), to.bottom()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from the HSV model. `hue` is in degrees (wrapped into
    /// `[0, 360)`), `saturation` and `value` are in `[0, 1]`.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::rgba((r + m) as f32, (g + m) as f32, (b + m) as f32, 1.0)
    }

    /// 8-bit RGB channels, rounded.
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_roundtrip() {
        let r = Rect::from_corners(1.0, 2.0, 4.0, 8.0);
        assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 6.0));
        assert_eq!(r.right(), 4.0);
        assert_eq!(r.bottom(), 8.0);
    }

    #[test]
    fn normalized_flips_negative_extent() {
        let r = Rect::new(10.0, 10.0, -4.0, -2.0).normalized();
        assert_eq!(r, Rect::new(6.0, 8.0, 4.0, 2.0));
    }

    #[test]
    fn contains_includes_edges() {
        let r = Rect::from_corners(0.0, 0.0, 3.0, 1.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(3.0, 1.0)));
        assert!(r.contains(Point::new(1.5, 0.5)));
        assert!(!r.contains(Point::new(3.01, 0.5)));
        assert!(!r.contains(Point::new(1.0, -0.1)));
    }

    #[test]
    fn lerp_moves_corners() {
        let a = Rect::from_corners(0.0, 0.0, 2.0, 1.0);
        let b = Rect::from_corners(1.0, 0.5, 3.0, 0.75);
        assert_eq!(a.lerp(&b, 0.0), a);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.left() - 0.5).abs() < 1e-12);
        assert!((mid.top() - 0.25).abs() < 1e-12);
        assert!((mid.right() - 2.5).abs() < 1e-12);
        assert!((mid.bottom() - 0.875).abs() < 1e-12);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0).to_rgb8(), [255, 0, 0]);
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0).to_rgb8(), [0, 255, 0]);
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0).to_rgb8(), [0, 0, 255]);
        assert_eq!(Color::from_hsv(42.0, 0.0, 1.0).to_rgb8(), [255, 255, 255]);
        assert_eq!(Color::from_hsv(360.0, 1.0, 1.0).to_rgb8(), [255, 0, 0]);
    }

    #[test]
    fn hex_notation() {
        assert_eq!(Color::WHITE.to_hex(), "#ffffff");
        assert_eq!(Color::rgba(1.0, 0.5, 0.0, 1.0).to_hex(), "#ff8000");
    }
}
