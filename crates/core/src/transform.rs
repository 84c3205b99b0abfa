use icicle_protocol::{Point, Rect};

/// Axis-aligned affine map: independent x/y scale plus translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Map taking `data` onto `window` (window-from-data).
    ///
    /// A zero-width or zero-height `data` rect yields non-finite scales;
    /// check [`Transform::is_finite`] before drawing with the result.
    pub fn affine_map(window: &Rect, data: &Rect) -> Self {
        let sx = window.w / data.w;
        let sy = window.h / data.h;
        Self {
            sx,
            sy,
            tx: window.left() - sx * data.left(),
            ty: window.top() - sy * data.top(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.sx.is_finite() && self.sy.is_finite() && self.tx.is_finite() && self.ty.is_finite()
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    /// Map both corners; the result always has non-negative extents.
    pub fn map_rect(&self, r: &Rect) -> Rect {
        let tl = self.map_point(Point::new(r.left(), r.top()));
        let br = self.map_point(Point::new(r.right(), r.bottom()));
        Rect::from_corners(tl.x, tl.y, br.x, br.y).normalized()
    }

    /// Data-from-window, for hit testing. `None` when a scale is zero or
    /// the map is not finite.
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() || self.sx == 0.0 || self.sy == 0.0 {
            return None;
        }
        Some(Self {
            sx: 1.0 / self.sx,
            sy: 1.0 / self.sy,
            tx: -self.tx / self.sx,
            ty: -self.ty / self.sy,
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
