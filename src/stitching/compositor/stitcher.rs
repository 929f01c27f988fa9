use rayon::prelude::*;
use tracing::{debug, info, info_span, instrument};

use crate::stitching::camera::{EquirectangularCamera, PinholeCamera, Projection};
use crate::stitching::canvas::{horizontal_canvas, panorama_canvas, vertical_canvas};
use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::compositor::{PipelineTimings, StitcherConfig};
use crate::stitching::exposure::ExposureCompensator;
use crate::stitching::image::{FloatImage, ImageData};
use crate::stitching::tiles::{Tile, build_tiles};

/// Blends images from a fixed camera rig onto a virtual canvas.
///
/// Canvas, tiles and weights are computed once at construction; every
/// [`Stitcher::stitch`] call only warps, compensates and blends.
pub struct Stitcher<V: Projection> {
    cameras: Vec<PinholeCamera>,
    canvas: V,
    tiles: Vec<Tile>,
    compensator: Box<dyn ExposureCompensator>,
    config: StitcherConfig,
}

impl Stitcher<PinholeCamera> {
    /// Cameras side by side, ordered left to right.
    pub fn horizontal(cameras: Vec<PinholeCamera>, config: StitcherConfig) -> Result<Self> {
        let canvas = horizontal_canvas(&cameras, config.focal_convention)?;
        Self::with_canvas(cameras, canvas, config)
    }

    /// Cameras stacked, ordered top to bottom.
    pub fn vertical(cameras: Vec<PinholeCamera>, config: StitcherConfig) -> Result<Self> {
        let canvas = vertical_canvas(&cameras, config.focal_convention)?;
        Self::with_canvas(cameras, canvas, config)
    }

    pub fn left_right(left: PinholeCamera, right: PinholeCamera, config: StitcherConfig) -> Result<Self> {
        Self::horizontal(vec![left, right], config)
    }
}

impl Stitcher<EquirectangularCamera> {
    /// Cameras in any orientation on an equirectangular canvas.
    pub fn panorama(cameras: Vec<PinholeCamera>, config: StitcherConfig) -> Result<Self> {
        let canvas = panorama_canvas(&cameras)?;
        Self::with_canvas(cameras, canvas, config)
    }
}

impl<V: Projection> Stitcher<V> {
    #[instrument(skip_all, fields(cameras = cameras.len(), width = canvas.width(), height = canvas.height()))]
    pub fn with_canvas(cameras: Vec<PinholeCamera>, canvas: V, config: StitcherConfig) -> Result<Self> {
        if cameras.is_empty() {
            return Err(StitchError::EmptyCameraList);
        }

        let tiles = build_tiles(&cameras, &canvas, config.focal_convention, config.weight_epsilon)?;
        let compensator = config.compensation.build();
        info!(
            tiles = tiles.len(),
            compensator = compensator.name(),
            "Stitcher ready"
        );

        Ok(Self {
            cameras,
            canvas,
            tiles,
            compensator,
            config,
        })
    }

    /// Replaces the compensator selected by the configuration.
    pub fn with_compensator(mut self, compensator: Box<dyn ExposureCompensator>) -> Self {
        debug!(compensator = compensator.name(), "Using custom compensator");
        self.compensator = compensator;
        self
    }

    pub fn cameras(&self) -> &[PinholeCamera] {
        &self.cameras
    }

    pub fn canvas(&self) -> &V {
        &self.canvas
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn config(&self) -> &StitcherConfig {
        &self.config
    }

    pub fn compensator_name(&self) -> &'static str {
        self.compensator.name()
    }

    /// Stitches one image per camera, in camera order, into a canvas-sized
    /// image of the same pixel type and channel count.
    pub fn stitch(&self, images: &[ImageData]) -> Result<ImageData> {
        let mut timings = PipelineTimings::new();
        self.run(images, &mut timings)
    }

    pub fn stitch_with_timings(&self, images: &[ImageData]) -> Result<(ImageData, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let output = self.run(images, &mut timings)?;
        Ok((output, timings))
    }

    fn run(&self, images: &[ImageData], timings: &mut PipelineTimings) -> Result<ImageData> {
        let _span = info_span!("stitch", images = images.len()).entered();

        timings.time("validate", || self.validate(images))?;

        let first = &images[0];
        let (cw, ch) = (self.canvas.width(), self.canvas.height());
        if self.tiles.is_empty() {
            debug!("No tile reaches the canvas");
            return Ok(ImageData::zeros(cw, ch, first.channels(), first.pixel_type()));
        }

        let warped = timings.time("warp", || {
            self.tiles
                .iter()
                .map(|tile| tile.warp_image(&images[tile.camera_index()]))
                .collect::<Vec<_>>()
        });

        let corrected = timings.time("compensate", || self.compensator.compensate(&self.tiles, warped));
        self.check_compensated(&corrected, first.channels())?;

        let output = timings.time("blend", || {
            let mut canvas = FloatImage::zeros(cw, ch, first.channels());
            for (tile, image) in self.tiles.iter().zip(&corrected) {
                accumulate(&mut canvas, tile, image);
            }
            ImageData::from_float(&canvas, first.pixel_type())
        });

        info!(
            width = cw,
            height = ch,
            elapsed_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Stitch complete"
        );
        Ok(output)
    }

    fn validate(&self, images: &[ImageData]) -> Result<()> {
        if images.len() != self.cameras.len() {
            return Err(StitchError::ImageCountMismatch {
                expected: self.cameras.len(),
                actual: images.len(),
            });
        }

        let first = &images[0];
        for (index, (image, camera)) in images.iter().zip(&self.cameras).enumerate() {
            if image.pixel_type() != first.pixel_type() {
                return Err(StitchError::PixelTypeMismatch {
                    expected: first.pixel_type(),
                    actual: image.pixel_type(),
                });
            }
            if image.channels() != first.channels() {
                return Err(StitchError::ChannelCountMismatch {
                    expected: first.channels(),
                    actual: image.channels(),
                });
            }
            if self.config.validate_dimensions
                && (image.width() != camera.width() || image.height() != camera.height())
            {
                return Err(StitchError::DimensionMismatch {
                    index,
                    expected_width: camera.width(),
                    expected_height: camera.height(),
                    actual_width: image.width(),
                    actual_height: image.height(),
                });
            }
        }
        Ok(())
    }

    /// The compensator must hand back one image per tile, shaped like the tile.
    fn check_compensated(&self, corrected: &[FloatImage], channels: usize) -> Result<()> {
        if corrected.len() != self.tiles.len() {
            return Err(StitchError::InvalidCompensation(format!(
                "{} returned {} images for {} tiles",
                self.compensator.name(),
                corrected.len(),
                self.tiles.len()
            )));
        }
        for (index, (tile, image)) in self.tiles.iter().zip(corrected).enumerate() {
            let (w, h) = (tile.rect().width(), tile.rect().height());
            if image.width != w
                || image.height != h
                || image.channels != channels
                || image.data.len() != w * h * channels
            {
                return Err(StitchError::InvalidCompensation(format!(
                    "{} returned a {}x{}x{} image for tile {} ({}x{}x{})",
                    self.compensator.name(),
                    image.width,
                    image.height,
                    image.channels,
                    index,
                    w,
                    h,
                    channels
                )));
            }
        }
        Ok(())
    }
}

/// Adds `image * weight` into the tile's region of `canvas`.
fn accumulate(canvas: &mut FloatImage, tile: &Tile, image: &FloatImage) {
    let rect = tile.rect();
    let channels = canvas.channels;
    let (x0, w) = (rect.x as usize, rect.width());
    let row_len = canvas.width * channels;

    canvas
        .data
        .par_chunks_mut(row_len)
        .skip(rect.y as usize)
        .take(rect.height())
        .enumerate()
        .for_each(|(row, canvas_row)| {
            let dst = &mut canvas_row[x0 * channels..(x0 + w) * channels];
            let src = &image.data[row * w * channels..(row + 1) * w * channels];
            let weights = &tile.weights()[row * w..(row + 1) * w];
            for ((out, px), &weight) in dst.chunks_exact_mut(channels).zip(src.chunks_exact(channels)).zip(weights) {
                if weight == 0.0 {
                    continue;
                }
                for (o, &v) in out.iter_mut().zip(px) {
                    *o += v * weight;
                }
            }
        });
}
