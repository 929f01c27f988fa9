use tracing::{debug, instrument};

use crate::stitching::exposure::ExposureCompensator;
use crate::stitching::image::FloatImage;
use crate::stitching::tiles::Tile;

/// Chains a constant offset from each tile to its predecessor.
///
/// The first image is the reference. Every following image is shifted by
/// the difference of medians over the pixels it shares with the previous,
/// already corrected, image. Only neighbours in rig order are compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveCompensator;

impl ExposureCompensator for AdditiveCompensator {
    #[instrument(skip_all, fields(tiles = tiles.len()))]
    fn compensate(&self, tiles: &[Tile], images: Vec<FloatImage>) -> Vec<FloatImage> {
        let mut corrected: Vec<FloatImage> = Vec::with_capacity(images.len());

        for (i, mut image) in images.into_iter().enumerate() {
            if let Some(prev) = corrected.last() {
                let bias = overlap_bias(&tiles[i - 1], prev, &tiles[i], &image);
                debug!(camera_index = tiles[i].camera_index(), bias, "Exposure offset");
                if bias != 0.0 {
                    image.add_scalar(bias);
                }
            }
            corrected.push(image);
        }
        corrected
    }

    fn name(&self) -> &'static str {
        "additive"
    }
}

/// `median(prev) - median(current)` over the pixels valid in both tiles, or
/// 0 when they share none.
fn overlap_bias(prev_tile: &Tile, prev: &FloatImage, tile: &Tile, image: &FloatImage) -> f32 {
    let Some(overlap) = prev_tile.rect().intersect(tile.rect()) else {
        return 0.0;
    };
    let in_prev = overlap.relative_to(prev_tile.rect());
    let in_cur = overlap.relative_to(tile.rect());

    let mut prev_samples = Vec::new();
    let mut cur_samples = Vec::new();
    for y in 0..overlap.height() {
        for x in 0..overlap.width() {
            let (px, py) = (in_prev.x as usize + x, in_prev.y as usize + y);
            let (cx, cy) = (in_cur.x as usize + x, in_cur.y as usize + y);
            if prev_tile.is_valid(px, py) && tile.is_valid(cx, cy) {
                prev_samples.extend_from_slice(prev.pixel(px, py));
                cur_samples.extend_from_slice(image.pixel(cx, cy));
            }
        }
    }

    match (median(&mut prev_samples), median(&mut cur_samples)) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

/// Median of `values`, averaging the middle pair for even counts.
pub(crate) fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
