use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use camstitch_rs::logger;
use camstitch_rs::stitching::{
    CalibrationData, CameraParams, CompensationMode, ImageData, PinholeCamera, PixelData, StandardTiffWriter,
    Stitcher, StitcherConfig, TiffCompression, TiffOutputConfig, TiffWriter,
};
use tracing::{info, warn};

fn sample_rig() -> Result<Vec<PinholeCamera>> {
    let left = PinholeCamera::new(CameraParams {
        width: 640,
        height: 512,
        fx: 1487.0897209580626,
        fy: 1486.893999534694,
        cx: 319.5,
        cy: 255.5,
        roll: -0.6953680852913573,
        pitch: 0.3175409097871985,
        yaw: 10.942382806743069,
    })?;
    let right = PinholeCamera::new(CameraParams {
        width: 640,
        height: 512,
        fx: 1492.120223972608,
        fy: 1492.126838008826,
        cx: 319.5,
        cy: 255.5,
        roll: -0.25389265482939055,
        pitch: 0.7082357267631507,
        yaw: -11.468243408503717,
    })?;
    Ok(vec![left, right])
}

/// Cameras from a calibration file, ordered left to right.
fn calibrated_rig(path: &Path) -> Result<Vec<PinholeCamera>> {
    let calibration = CalibrationData::from_json_file(path)
        .with_context(|| format!("failed to load calibration {}", path.display()))?;

    let mut cameras = Vec::new();
    for id in calibration.camera_ids() {
        match calibration.camera(id) {
            Ok(camera) => cameras.push(camera),
            Err(e) => warn!("Skipping camera {}: {}", id, e),
        }
    }
    if cameras.is_empty() {
        bail!("no usable camera in {}", path.display());
    }
    // positive yaw looks left
    cameras.sort_by(|a, b| b.yaw().total_cmp(&a.yaw()));
    Ok(cameras)
}

/// Diagonal ramp with a per-camera brightness offset.
fn synthetic_frame(camera: &PinholeCamera, offset: u16) -> Result<ImageData> {
    let (w, h) = (camera.width(), camera.height());
    let data = (0..w * h)
        .map(|i| ((i % w + i / w) * 16) as u16 % 40000 + offset)
        .collect();
    Ok(ImageData::new(w, h, 1, PixelData::U16(data))?)
}

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    args.retain(|a| a != "-v" && a != "--verbose");
    logger::init_with(if verbose { "debug" } else { "info" });

    info!("Starting camstitch...");

    let cameras = match args.first() {
        Some(path) => calibrated_rig(Path::new(path))?,
        None => sample_rig()?,
    };
    let output_path = PathBuf::from(args.get(1).map(String::as_str).unwrap_or("stitched.tiff"));

    let config = StitcherConfig::builder()
        .compensation(CompensationMode::Additive)
        .build();
    let stitcher = Stitcher::horizontal(cameras, config)
        .context("failed to set up stitcher")?;
    info!(
        "Canvas {}x{} (hfov {:.2}, vfov {:.2}), {} tiles, compensation: {}",
        stitcher.canvas().width(),
        stitcher.canvas().height(),
        stitcher.canvas().hfov(),
        stitcher.canvas().vfov(),
        stitcher.tiles().len(),
        stitcher.compensator_name()
    );

    let frames = stitcher
        .cameras()
        .iter()
        .enumerate()
        .map(|(i, camera)| synthetic_frame(camera, i as u16 * 4000))
        .collect::<Result<Vec<_>>>()?;

    let (stitched, timings) = stitcher.stitch_with_timings(&frames)?;
    timings.log_summary();

    let config = TiffOutputConfig::builder()
        .compression(TiffCompression::Lzw)
        .predictor(Some(2))
        .build();
    StandardTiffWriter
        .write_tiff_file(&stitched, &output_path, &config)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    info!("Wrote {}", output_path.display());
    Ok(())
}
