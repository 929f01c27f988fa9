use tracing::{debug, info, instrument};

use crate::stitching::camera::{FocalConvention, PinholeCamera, Projection};
use crate::stitching::common::error::Result;
use crate::stitching::image::{FloatImage, ImageData, RemapTable, remap_bilinear};
use crate::stitching::tiles::distance::{Boundary, distance_transform};
use crate::stitching::tiles::rect::{Rect, bounding_rect};

/// Slack below zero accepted for source coordinates on an exact image edge.
pub const MAP_TOLERANCE: f32 = 1e-3;

/// The canvas region one camera contributes to.
#[derive(Debug, Clone)]
pub struct Tile {
    camera_index: usize,
    rect: Rect,
    maps: RemapTable,
    mask: Vec<u8>,
    weights: Vec<f32>,
}

impl Tile {
    pub(crate) fn new(
        camera_index: usize,
        rect: Rect,
        maps: RemapTable,
        mask: Vec<u8>,
        weights: Vec<f32>,
    ) -> Self {
        assert_eq!(mask.len(), rect.area(), "mask size must equal rect area");
        assert_eq!(weights.len(), rect.area(), "weights size must equal rect area");
        Self {
            camera_index,
            rect,
            maps,
            mask,
            weights,
        }
    }

    /// Builds the tile of `camera` on `canvas` with raw (unnormalized)
    /// distance weights; `None` when the camera does not reach the canvas.
    ///
    /// Weights measure the distance to the nearest canvas cell the camera
    /// does not see. The canvas border itself is not such a cell.
    pub fn from_camera<V: Projection + ?Sized>(
        camera_index: usize,
        camera: &PinholeCamera,
        canvas: &V,
        convention: FocalConvention,
    ) -> Result<Option<Self>> {
        let (cw, ch) = (canvas.width(), canvas.height());
        let maps = canvas.maps_from(camera, convention);

        let (sw, sh) = (camera.width() as f32, camera.height() as f32);
        let full_mask: Vec<u8> = maps
            .map_x()
            .iter()
            .zip(maps.map_y())
            .map(|(&x, &y)| {
                let valid = x >= -MAP_TOLERANCE && x < sw && y >= -MAP_TOLERANCE && y < sh;
                u8::from(valid)
            })
            .collect();

        let Some(rect) = bounding_rect(&full_mask, cw, ch).and_then(|r| r.clamp_to(cw, ch)) else {
            debug!(camera_index, "Camera does not reach the canvas, tile dropped");
            return Ok(None);
        };

        let maps = maps.crop(&rect);
        let mask = rect.extract(&full_mask, cw, 1);
        let boundary = Boundary::of_rect(&rect, cw, ch);
        let weights = distance_transform(&mask, rect.width(), rect.height(), boundary)?;
        debug!(camera_index, x = rect.x, y = rect.y, w = rect.w, h = rect.h, "Built tile");

        Ok(Some(Self::new(camera_index, rect, maps, mask, weights)))
    }

    pub fn camera_index(&self) -> usize {
        self.camera_index
    }

    /// Region in canvas coordinates
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn maps(&self) -> &RemapTable {
        &self.maps
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.mask[y * self.rect.width() + x] != 0
    }

    /// Resamples the camera image into the tile's region.
    pub fn warp_image(&self, image: &ImageData) -> FloatImage {
        remap_bilinear(image, &self.maps)
    }
}

/// Scales tile weights so that they sum to one wherever any tile covers the
/// canvas. Sums below `epsilon` are clamped to it.
pub fn normalize_weights(tiles: &mut [Tile], canvas_width: usize, canvas_height: usize, epsilon: f32) {
    let mut sum = vec![0.0f32; canvas_width * canvas_height];
    for tile in tiles.iter() {
        let w = tile.rect.width();
        for row in 0..tile.rect.height() {
            let span = tile.rect.row_span(row, canvas_width, 1);
            let weights = &tile.weights[row * w..(row + 1) * w];
            for (s, &wt) in sum[span].iter_mut().zip(weights) {
                *s += wt;
            }
        }
    }
    for s in sum.iter_mut() {
        *s = s.max(epsilon);
    }

    for tile in tiles.iter_mut() {
        let w = tile.rect.width();
        for row in 0..tile.rect.height() {
            let span = tile.rect.row_span(row, canvas_width, 1);
            let weights = &mut tile.weights[row * w..(row + 1) * w];
            for (wt, &s) in weights.iter_mut().zip(&sum[span]) {
                *wt /= s;
            }
        }
    }
}

/// Tiles of every camera that reaches `canvas`, with normalized weights.
/// Dropped cameras leave no tile; the others keep their camera index.
#[instrument(skip(cameras, canvas), fields(cameras = cameras.len()))]
pub fn build_tiles<V: Projection + ?Sized>(
    cameras: &[PinholeCamera],
    canvas: &V,
    convention: FocalConvention,
    epsilon: f32,
) -> Result<Vec<Tile>> {
    let mut tiles = Vec::with_capacity(cameras.len());
    for (index, camera) in cameras.iter().enumerate() {
        if let Some(tile) = Tile::from_camera(index, camera, canvas, convention)? {
            tiles.push(tile);
        }
    }
    normalize_weights(&mut tiles, canvas.width(), canvas.height(), epsilon);
    info!(tiles = tiles.len(), dropped = cameras.len() - tiles.len(), "Built warp tiles");
    Ok(tiles)
}
