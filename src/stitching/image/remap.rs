use rayon::prelude::*;

use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::image::types::{FloatImage, ImageData, PixelData, Sample};
use crate::stitching::tiles::Rect;

/// Per-pixel source coordinates for a destination grid
#[derive(Debug, Clone, PartialEq)]
pub struct RemapTable {
    width: usize,
    height: usize,
    map_x: Vec<f32>,
    map_y: Vec<f32>,
}

impl RemapTable {
    pub fn new(width: usize, height: usize, map_x: Vec<f32>, map_y: Vec<f32>) -> Result<Self> {
        if map_x.len() != width * height || map_y.len() != width * height {
            return Err(StitchError::InvalidImageBuffer(format!(
                "remap table {}x{} needs {} entries per map, got {} and {}",
                width,
                height,
                width * height,
                map_x.len(),
                map_y.len()
            )));
        }
        Ok(Self {
            width,
            height,
            map_x,
            map_y,
        })
    }

    /// Fills a `width x height` table row by row from `f(x, y) -> (src_x, src_y)`.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> (f64, f64) + Sync,
    {
        let mut map_x = vec![0.0f32; width * height];
        let mut map_y = vec![0.0f32; width * height];

        if width > 0 {
            map_x
                .par_chunks_mut(width)
                .zip(map_y.par_chunks_mut(width))
                .enumerate()
                .for_each(|(y, (row_x, row_y))| {
                    for x in 0..width {
                        let (sx, sy) = f(x, y);
                        row_x[x] = sx as f32;
                        row_y[x] = sy as f32;
                    }
                });
        }

        Self {
            width,
            height,
            map_x,
            map_y,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn map_x(&self) -> &[f32] {
        &self.map_x
    }

    pub fn map_y(&self) -> &[f32] {
        &self.map_y
    }

    pub fn get(&self, x: usize, y: usize) -> (f32, f32) {
        let idx = y * self.width + x;
        (self.map_x[idx], self.map_y[idx])
    }

    /// Sub-table covering `rect`, which must lie inside the table.
    pub fn crop(&self, rect: &Rect) -> Self {
        Self {
            width: rect.width(),
            height: rect.height(),
            map_x: rect.extract(&self.map_x, self.width, 1),
            map_y: rect.extract(&self.map_y, self.width, 1),
        }
    }
}

/// Resamples `src` through `table` with bilinear interpolation and replicated borders.
pub fn remap_bilinear(src: &ImageData, table: &RemapTable) -> FloatImage {
    match src.data() {
        PixelData::U8(data) => remap_samples(data, src.width(), src.height(), src.channels(), table),
        PixelData::U16(data) => remap_samples(data, src.width(), src.height(), src.channels(), table),
        PixelData::F32(data) => remap_samples(data, src.width(), src.height(), src.channels(), table),
    }
}

fn remap_samples<T: Sample>(
    data: &[T],
    width: usize,
    height: usize,
    channels: usize,
    table: &RemapTable,
) -> FloatImage {
    let mut dst = FloatImage::zeros(table.width, table.height, channels);
    let row_len = table.width * channels;
    if row_len == 0 || width == 0 || height == 0 {
        return dst;
    }

    dst.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..table.width {
                let (sx, sy) = table.get(x, y);
                let out = &mut row[x * channels..(x + 1) * channels];
                sample_bilinear(data, width, height, channels, sx, sy, out);
            }
        });

    dst
}

fn sample_bilinear<T: Sample>(
    data: &[T],
    width: usize,
    height: usize,
    channels: usize,
    x: f32,
    y: f32,
    out: &mut [f32],
) {
    // far-away or undefined coordinates sample the nearest edge
    let x = bound(x, width);
    let y = bound(y, height);
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;

    let x0 = x0f as isize;
    let y0 = y0f as isize;
    let cx0 = replicate(x0, width);
    let cx1 = replicate(x0.saturating_add(1), width);
    let cy0 = replicate(y0, height);
    let cy1 = replicate(y0.saturating_add(1), height);

    for (c, value) in out.iter_mut().enumerate() {
        let at = |px: usize, py: usize| data[(py * width + px) * channels + c].to_f32();
        let top = at(cx0, cy0) * (1.0 - fx) + at(cx1, cy0) * fx;
        let bottom = at(cx0, cy1) * (1.0 - fx) + at(cx1, cy1) * fx;
        *value = top * (1.0 - fy) + bottom * fy;
    }
}

fn bound(coord: f32, len: usize) -> f32 {
    if coord.is_nan() { 0.0 } else { coord.clamp(-1.0, len as f32) }
}

fn replicate(coord: isize, len: usize) -> usize {
    coord.clamp(0, len as isize - 1) as usize
}
