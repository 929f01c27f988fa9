//! Axis-aligned integer regions in canvas or tile space

use std::ops::Range;

/// Region defined by its top-left corner and size.
///
/// Coordinates are signed so that regions can be shifted or expressed
/// relative to another region before they are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Region spanning the inclusive pixel bounds `[x_min, x_max] x [y_min, y_max]`.
    pub fn from_bounds(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self::new(x_min, y_min, x_max - x_min + 1, y_max - y_min + 1)
    }

    pub fn width(&self) -> usize {
        self.w.max(0) as usize
    }

    pub fn height(&self) -> usize {
        self.h.max(0) as usize
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn shift(&self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// The same region expressed in the local frame of `origin`.
    pub fn relative_to(&self, origin: &Rect) -> Self {
        self.shift(-origin.x, -origin.y)
    }

    /// Clamps to `[0, max_w) x [0, max_h)`, `None` if nothing is left.
    pub fn clamp_to(&self, max_w: usize, max_h: usize) -> Option<Self> {
        let x = self.x.max(0);
        let y = self.y.max(0);
        let x_end = (self.x + self.w).min(max_w as i64);
        let y_end = (self.y + self.h).min(max_h as i64);
        let rect = Self::new(x, y, x_end - x, y_end - y);
        (!rect.is_empty()).then_some(rect)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x_end = (self.x + self.w).min(other.x + other.w);
        let y_end = (self.y + self.h).min(other.y + other.h);
        let rect = Self::new(x, y, x_end - x, y_end - y);
        (!rect.is_empty()).then_some(rect)
    }

    /// Sample range of local row `row` inside a row-major buffer `stride` pixels wide.
    ///
    /// The region must be non-negative and fit inside the buffer.
    pub fn row_span(&self, row: usize, stride: usize, channels: usize) -> Range<usize> {
        debug_assert!(self.x >= 0 && self.y >= 0, "row_span on unclamped rect {self:?}");
        let start = ((self.y as usize + row) * stride + self.x as usize) * channels;
        start..start + self.width() * channels
    }

    /// Copies the region out of a row-major buffer.
    pub fn extract<T: Copy>(&self, data: &[T], stride: usize, channels: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(self.area() * channels);
        for row in 0..self.height() {
            out.extend_from_slice(&data[self.row_span(row, stride, channels)]);
        }
        out
    }
}

/// Tight bounds of the non-zero cells of a `width x height` mask.
pub fn bounding_rect(mask: &[u8], width: usize, height: usize) -> Option<Rect> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for y in 0..height {
        let row = &mask[y * width..(y + 1) * width];
        let Some(first) = row.iter().position(|&m| m != 0) else {
            continue;
        };
        let last = row.iter().rposition(|&m| m != 0).unwrap_or(first);
        bounds = Some(match bounds {
            None => (first, y, last, y),
            Some((x0, y0, x1, _)) => (x0.min(first), y0, x1.max(last), y),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| Rect::from_bounds(x0 as i64, y0 as i64, x1 as i64, y1 as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 8, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 8, 5, 2)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 4, 4)), None);
    }

    #[test]
    fn test_clamp_to() {
        let rect = Rect::new(-3, 4, 10, 10);
        assert_eq!(rect.clamp_to(5, 8), Some(Rect::new(0, 4, 5, 4)));
        assert_eq!(Rect::new(6, 0, 3, 3).clamp_to(5, 8), None);
    }

    #[test]
    fn test_relative_to() {
        let overlap = Rect::new(12, 7, 3, 2);
        let tile = Rect::new(10, 5, 20, 20);
        assert_eq!(overlap.relative_to(&tile), Rect::new(2, 2, 3, 2));
    }

    #[test]
    fn test_extract_with_channels() {
        // 4x3 buffer with 2 channels, value = 10*y + x for both channels
        let data: Vec<u32> = (0..3)
            .flat_map(|y| (0..4).flat_map(move |x| [10 * y + x, 10 * y + x]))
            .collect();
        let rect = Rect::new(1, 1, 2, 2);
        assert_eq!(rect.extract(&data, 4, 2), vec![11, 11, 12, 12, 21, 21, 22, 22]);
    }

    #[test]
    fn test_bounding_rect() {
        #[rustfmt::skip]
        let mask = [
            0, 0, 0, 0, 0,
            0, 0, 1, 0, 0,
            0, 1, 1, 0, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(bounding_rect(&mask, 5, 4), Some(Rect::new(1, 1, 2, 2)));
        assert_eq!(bounding_rect(&[0; 6], 3, 2), None);
    }
}
