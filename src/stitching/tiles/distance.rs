use rayon::prelude::*;

use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::tiles::rect::Rect;

/// Squared distance standing in for "no site reachable".
const FAR: f64 = 1e20;

/// Which sides of a grid are bordered by invalid cells.
///
/// A tile side strictly inside the canvas is closed: the cells just past it
/// belong to the canvas but not to the camera. A side on the canvas border is
/// open, nothing lies beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Boundary {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Boundary {
    pub const OPEN: Self = Self {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    pub const CLOSED: Self = Self {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Boundary of `rect` placed on a `canvas_width x canvas_height` canvas.
    pub fn of_rect(rect: &Rect, canvas_width: usize, canvas_height: usize) -> Self {
        Self {
            left: rect.x > 0,
            top: rect.y > 0,
            right: rect.x + rect.w < canvas_width as i64,
            bottom: rect.y + rect.h < canvas_height as i64,
        }
    }
}

/// Exact Euclidean distance from every non-zero cell of `mask` to the nearest
/// zero cell. Cells just outside the `width x height` grid count as zero on
/// the sides `boundary` closes. Zero cells get 0; when no zero cell exists at
/// all, every cell gets `width.max(height)`.
///
/// Two passes of the lower-envelope-of-parabolas transform, columns then rows.
pub fn distance_transform(mask: &[u8], width: usize, height: usize, boundary: Boundary) -> Result<Vec<f32>> {
    if mask.len() != width * height {
        return Err(StitchError::InvalidImageBuffer(format!(
            "mask has {} cells, expected {}x{}",
            mask.len(),
            width,
            height
        )));
    }
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let pw = width + 2;
    let ph = height + 2;
    let mut grid = vec![FAR; pw * ph];
    for y in 0..ph {
        for x in 0..pw {
            let (left, right) = (x == 0, x == pw - 1);
            let (top, bottom) = (y == 0, y == ph - 1);
            let site = match (left || right, top || bottom) {
                (false, false) => mask[(y - 1) * width + x - 1] == 0,
                (true, false) => (left && boundary.left) || (right && boundary.right),
                (false, true) => (top && boundary.top) || (bottom && boundary.bottom),
                // corners sit outside the grid on both axes
                (true, true) => {
                    let horizontal = (left && boundary.left) || (right && boundary.right);
                    let vertical = (top && boundary.top) || (bottom && boundary.bottom);
                    horizontal && vertical
                }
            };
            if site {
                grid[y * pw + x] = 0.0;
            }
        }
    }

    let mut column = vec![0.0f64; ph];
    let mut out = vec![0.0f64; ph];
    for x in 0..pw {
        for y in 0..ph {
            column[y] = grid[y * pw + x];
        }
        lower_envelope(&column, &mut out);
        for y in 0..ph {
            grid[y * pw + x] = out[y];
        }
    }

    grid.par_chunks_mut(pw).for_each(|row| {
        let input = row.to_vec();
        lower_envelope(&input, row);
    });

    let unreachable = width.max(height) as f32;
    let mut distances = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &grid[(y + 1) * pw + 1..(y + 1) * pw + 1 + width];
        distances.extend(
            row.iter()
                .map(|&d| if d >= FAR { unreachable } else { d.sqrt() as f32 }),
        );
    }
    Ok(distances)
}

/// 1D squared distance transform of the sampled function `f`; only finite
/// sites (`f < FAR`) take part in the envelope.
fn lower_envelope(f: &[f64], out: &mut [f64]) {
    let mut sites: Vec<usize> = Vec::with_capacity(f.len());
    let mut bounds: Vec<f64> = Vec::with_capacity(f.len());

    for (q, &fq) in f.iter().enumerate() {
        if fq >= FAR {
            continue;
        }
        let mut s = f64::NEG_INFINITY;
        while let Some(&p) = sites.last() {
            let (qf, pf) = (q as f64, p as f64);
            s = ((fq + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf));
            match bounds.last() {
                Some(&b) if s <= b => {
                    sites.pop();
                    bounds.pop();
                }
                _ => break,
            }
        }
        if sites.is_empty() {
            s = f64::NEG_INFINITY;
        }
        sites.push(q);
        bounds.push(s);
    }

    if sites.is_empty() {
        out.fill(FAR);
        return;
    }

    let mut k = 0;
    for (q, value) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < sites.len() && bounds[k + 1] < qf {
            k += 1;
        }
        let d = qf - sites[k] as f64;
        *value = d * d + f[sites[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_full_mask_distance_to_closed_border() {
        let mask = vec![1u8; 5 * 5];
        let d = distance_transform(&mask, 5, 5, Boundary::CLOSED).unwrap();
        assert_eq!(d[0], 1.0);
        assert_eq!(d[2 * 5 + 2], 3.0);
        assert_eq!(d[5 + 2], 2.0);
        assert_eq!(d[4 * 5 + 4], 1.0);
    }

    #[test]
    fn test_full_open_mask_is_constant() {
        let mask = vec![1u8; 7 * 4];
        let d = distance_transform(&mask, 7, 4, Boundary::OPEN).unwrap();
        assert!(d.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_open_sides_are_not_sites() {
        // only the right side is closed: distance grows leftwards, same on every row
        let (w, h) = (6, 4);
        let mask = vec![1u8; w * h];
        let boundary = Boundary {
            right: true,
            ..Boundary::OPEN
        };
        let d = distance_transform(&mask, w, h, boundary).unwrap();
        for y in 0..h {
            for x in 0..w {
                assert_eq!(d[y * w + x], (w - x) as f32);
            }
        }
    }

    #[test]
    fn test_invalid_cells_are_zero() {
        let mut mask = vec![1u8; 7 * 3];
        mask[3 + 7] = 0;
        let d = distance_transform(&mask, 7, 3, Boundary::CLOSED).unwrap();
        assert_eq!(d[3 + 7], 0.0);
        assert_eq!(d[2 + 7], 1.0);
        assert_eq!(d[4 + 7], 1.0);
        assert_eq!(d[1 + 7], 2.0);

        let open = distance_transform(&mask, 7, 3, Boundary::OPEN).unwrap();
        assert_abs_diff_eq!(open[0], 10f32.sqrt(), epsilon = 1e-6);
        assert_eq!(open[6 + 7], 3.0);
    }

    #[test]
    fn test_distance_is_euclidean() {
        // single hole in a large field, far from the closed border
        let (w, h) = (21, 21);
        let mut mask = vec![1u8; w * h];
        mask[10 * w + 10] = 0;
        let d = distance_transform(&mask, w, h, Boundary::CLOSED).unwrap();
        assert_abs_diff_eq!(d[13 * w + 14], 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(d[11 * w + 11], 2f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_mask() {
        let d = distance_transform(&[0u8; 6], 3, 2, Boundary::OPEN).unwrap();
        assert!(d.iter().all(|&v| v == 0.0));
        assert!(distance_transform(&[], 0, 0, Boundary::CLOSED).unwrap().is_empty());
    }

    #[test]
    fn test_mask_size_mismatch_is_an_error() {
        let err = distance_transform(&[1u8; 5], 3, 2, Boundary::CLOSED).unwrap_err();
        assert!(matches!(err, StitchError::InvalidImageBuffer(_)));
    }

    #[test]
    fn test_boundary_of_rect() {
        let b = Boundary::of_rect(&Rect::new(0, 3, 10, 7), 10, 12);
        assert_eq!(
            b,
            Boundary {
                left: false,
                top: true,
                right: false,
                bottom: true
            }
        );
        assert_eq!(Boundary::of_rect(&Rect::new(0, 0, 4, 4), 4, 4), Boundary::OPEN);
    }
}
