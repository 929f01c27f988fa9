use nalgebra::Matrix3;
use tracing::debug;

use crate::stitching::camera::projection::{FieldOfView, FocalConvention, Projection, apply_homography};
use crate::stitching::camera::types::{Camera, CameraParams};
use crate::stitching::camera::even_floor;
use crate::stitching::common::error::{Result, StitchError};
use crate::stitching::image::RemapTable;

/// Perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    camera: Camera,
}

impl PinholeCamera {
    pub fn new(params: CameraParams) -> Result<Self> {
        Camera::new(params).map(Self::from_camera)
    }

    pub fn from_camera(camera: Camera) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn params(&self) -> &CameraParams {
        self.camera.params()
    }

    pub fn width(&self) -> usize {
        self.camera.width()
    }

    pub fn height(&self) -> usize {
        self.camera.height()
    }

    pub fn fx(&self) -> f64 {
        self.camera.fx()
    }

    pub fn fy(&self) -> f64 {
        self.camera.fy()
    }

    pub fn cx(&self) -> f64 {
        self.camera.cx()
    }

    pub fn cy(&self) -> f64 {
        self.camera.cy()
    }

    pub fn roll(&self) -> f64 {
        self.camera.roll()
    }

    pub fn pitch(&self) -> f64 {
        self.camera.pitch()
    }

    pub fn yaw(&self) -> f64 {
        self.camera.yaw()
    }

    /// Horizontal field of view in degrees.
    pub fn hfov(&self) -> f64 {
        (2.0 * (self.width() as f64 / (2.0 * self.fx())).atan()).to_degrees()
    }

    /// Vertical field of view in degrees.
    pub fn vfov(&self) -> f64 {
        (2.0 * (self.height() as f64 / (2.0 * self.fy())).atan()).to_degrees()
    }

    /// Mean focal length.
    pub fn scale(&self) -> f64 {
        (self.fx() + self.fy()) / 2.0
    }

    /// Homography taking pixels of this camera to pixels of `target`:
    /// `H = K_t * R_t^T * R_s * K_s^-1`, with `K` sign-adjusted by `convention`.
    pub fn homography_to(&self, target: &PinholeCamera, convention: FocalConvention) -> Matrix3<f64> {
        let sign = convention.sign_matrix();
        let k_target = target.camera.intrinsics() * sign;
        // (K * S)^-1 = S * K^-1 since S is its own inverse
        let k_source_inv = sign * self.camera.intrinsics_inverse();
        k_target * target.camera.rotation().transpose() * self.camera.rotation() * k_source_inv
    }

    /// Image corners in clockwise order starting top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (w, h) = (self.width() as f64, self.height() as f64);
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
    }

    /// Camera covering the image minus the given margins.
    ///
    /// The principal point moves by the left/top margins and the resulting
    /// resolution is truncated to even values.
    pub fn crop(&self, left: f64, top: f64, right: f64, bottom: f64) -> Result<Self> {
        if [left, top, right, bottom].iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(StitchError::InvalidCrop(format!(
                "Margins must be >= 0, got left={}, top={}, right={}, bottom={}",
                left, top, right, bottom
            )));
        }

        let width = even_floor(self.width() as f64 - left - right);
        let height = even_floor(self.height() as f64 - top - bottom);
        if width == 0 || height == 0 {
            return Err(StitchError::InvalidCrop(format!(
                "Crop exceeds image bounds: {}x{} with margins left={}, top={}, right={}, bottom={}",
                self.width(),
                self.height(),
                left,
                top,
                right,
                bottom
            )));
        }

        debug!(width, height, left, top, right, bottom, "Cropping camera");
        Self::new(CameraParams {
            width,
            height,
            cx: self.cx() - left,
            cy: self.cy() - top,
            ..*self.params()
        })
    }

    /// Virtual camera spanning `left` and `right` side by side.
    ///
    /// Focal lengths are averaged; the principal point and the pose are
    /// averaged with width weights so that folding a whole row of cameras
    /// keeps the result centered.
    pub fn hconcat(left: &PinholeCamera, right: &PinholeCamera) -> Result<Self> {
        if left.height() != right.height() {
            return Err(StitchError::ConcatMismatch {
                axis: "height",
                left: left.height(),
                right: right.height(),
            });
        }

        let width = left.width() + right.width();
        let wl = left.width() as f64 / width as f64;
        let wr = right.width() as f64 / width as f64;

        Self::new(CameraParams {
            width,
            height: left.height(),
            fx: (left.fx() + right.fx()) / 2.0,
            fy: (left.fy() + right.fy()) / 2.0,
            cx: wl * left.cx() + wr * (left.width() as f64 + right.cx()),
            cy: (left.cy() + right.cy()) / 2.0,
            roll: wl * left.roll() + wr * right.roll(),
            pitch: wl * left.pitch() + wr * right.pitch(),
            yaw: wl * left.yaw() + wr * right.yaw(),
        })
    }

    /// Virtual camera spanning `top` above `bottom`.
    pub fn vconcat(top: &PinholeCamera, bottom: &PinholeCamera) -> Result<Self> {
        if top.width() != bottom.width() {
            return Err(StitchError::ConcatMismatch {
                axis: "width",
                left: top.width(),
                right: bottom.width(),
            });
        }

        let height = top.height() + bottom.height();
        let wt = top.height() as f64 / height as f64;
        let wb = bottom.height() as f64 / height as f64;

        Self::new(CameraParams {
            width: top.width(),
            height,
            fx: (top.fx() + bottom.fx()) / 2.0,
            fy: (top.fy() + bottom.fy()) / 2.0,
            cx: (top.cx() + bottom.cx()) / 2.0,
            cy: wt * top.cy() + wb * (top.height() as f64 + bottom.cy()),
            roll: wt * top.roll() + wb * bottom.roll(),
            pitch: wt * top.pitch() + wb * bottom.pitch(),
            yaw: wt * top.yaw() + wb * bottom.yaw(),
        })
    }
}

impl Projection for PinholeCamera {
    fn width(&self) -> usize {
        self.camera.width()
    }

    fn height(&self) -> usize {
        self.camera.height()
    }

    fn field_of_view(&self) -> FieldOfView {
        FieldOfView {
            horizontal: self.hfov(),
            vertical: self.vfov(),
        }
    }

    fn maps_from(&self, source: &PinholeCamera, convention: FocalConvention) -> RemapTable {
        let h = self.homography_to(source, convention);
        RemapTable::from_fn(self.camera.width(), self.camera.height(), |x, y| {
            apply_homography(&h, x as f64, y as f64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn camera(yaw: f64) -> PinholeCamera {
        PinholeCamera::new(CameraParams {
            width: 640,
            height: 512,
            fx: 1000.0,
            fy: 1000.0,
            cx: 320.0,
            cy: 256.0,
            roll: 0.0,
            pitch: 0.0,
            yaw,
        })
        .unwrap()
    }

    #[test]
    fn test_field_of_view_and_scale() {
        let cam = PinholeCamera::new(CameraParams {
            fx: 320.0,
            fy: 300.0,
            ..*camera(0.0).params()
        })
        .unwrap();
        assert_relative_eq!(cam.hfov(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(cam.vfov(), 2.0 * (256.0f64 / 300.0).atan().to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(cam.scale(), 310.0);
    }

    #[test]
    fn test_crop_method() {
        let cropped = camera(0.0).crop(10.0, 10.0, 10.0, 10.0).unwrap();
        assert_eq!(cropped.width(), 620);
        assert_eq!(cropped.height(), 492);
        assert_eq!(cropped.cx(), 310.0);
        assert_eq!(cropped.cy(), 246.0);
        assert_eq!(cropped.fx(), 1000.0);
        assert_eq!(cropped.fy(), 1000.0);
    }

    #[test]
    fn test_crop_forces_even_resolution() {
        let cropped = camera(0.0).crop(0.5, 1.0, 2.0, 0.0).unwrap();
        assert_eq!(cropped.width(), 636);
        assert_eq!(cropped.height(), 510);
        assert_eq!(cropped.cx(), 319.5);
    }

    #[test]
    fn test_crop_validation() {
        let cam = camera(0.0);
        let err = cam.crop(-1.0, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, StitchError::InvalidCrop(ref msg) if msg.contains("Margins must be >= 0")));

        let err = cam.crop(0.0, 0.0, 640.0, 0.0).unwrap_err();
        assert!(matches!(err, StitchError::InvalidCrop(ref msg) if msg.contains("Crop exceeds image bounds")));
    }

    #[test]
    fn test_hconcat_identical_cameras() {
        let cam = camera(0.0);
        let joined = PinholeCamera::hconcat(&cam, &cam).unwrap();
        assert_eq!(joined.width(), 1280);
        assert_eq!(joined.height(), 512);
        assert_eq!(joined.fx(), 1000.0);
        assert_eq!(joined.fy(), 1000.0);
        assert_relative_eq!(joined.cx(), 640.0);
        assert_relative_eq!(joined.cy(), 256.0);
    }

    #[test]
    fn test_hconcat_of_three_stays_centered() {
        let row = [camera(20.0), camera(0.0), camera(-20.0)];
        let first = PinholeCamera::hconcat(&row[0], &row[1]).unwrap();
        let joined = PinholeCamera::hconcat(&first, &row[2]).unwrap();
        assert_eq!(joined.width(), 1920);
        assert_relative_eq!(joined.cx(), 960.0, epsilon = 1e-9);
        assert_abs_diff_eq!(joined.yaw(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_concat_requires_matching_resolution() {
        let tall = PinholeCamera::new(CameraParams {
            height: 480,
            ..*camera(0.0).params()
        })
        .unwrap();
        assert!(matches!(
            PinholeCamera::hconcat(&camera(0.0), &tall),
            Err(StitchError::ConcatMismatch { axis: "height", .. })
        ));

        let narrow = PinholeCamera::new(CameraParams {
            width: 320,
            ..*camera(0.0).params()
        })
        .unwrap();
        assert!(matches!(
            PinholeCamera::vconcat(&camera(0.0), &narrow),
            Err(StitchError::ConcatMismatch { axis: "width", .. })
        ));
    }

    #[test]
    fn test_vconcat_stacks_heights() {
        let joined = PinholeCamera::vconcat(&camera(0.0), &camera(0.0)).unwrap();
        assert_eq!(joined.width(), 640);
        assert_eq!(joined.height(), 1024);
        assert_relative_eq!(joined.cy(), 512.0);
        assert_relative_eq!(joined.cx(), 320.0);
    }

    #[test]
    fn test_homography_to_self_is_identity() {
        for convention in [FocalConvention::Negated, FocalConvention::Positive] {
            let cam = camera(13.0);
            assert_relative_eq!(
                cam.homography_to(&cam, convention),
                Matrix3::identity(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_positive_yaw_lands_left_under_negated_convention() {
        let canvas = camera(0.0);
        let left = camera(10.0);
        let h = left.homography_to(&canvas, FocalConvention::Negated);
        let (x, y) = apply_homography(&h, left.cx(), left.cy());
        assert_relative_eq!(x, 320.0 - 1000.0 * 10f64.to_radians().tan(), epsilon = 1e-6);
        assert_relative_eq!(y, 256.0, epsilon = 1e-6);

        let h = left.homography_to(&canvas, FocalConvention::Positive);
        let (x, _) = apply_homography(&h, left.cx(), left.cy());
        assert!(x > 320.0);
    }

    #[test]
    fn test_maps_from_inverts_homography() {
        let canvas = camera(0.0);
        let source = camera(-5.0);
        let maps = canvas.maps_from(&source, FocalConvention::Negated);
        assert_eq!((maps.width(), maps.height()), (640, 512));

        let h = source.homography_to(&canvas, FocalConvention::Negated);
        for &(sx, sy) in &[(100.0, 50.0), (320.0, 256.0), (500.0, 400.0)] {
            let (x, y) = apply_homography(&h, sx, sy);
            let (rx, ry) = (x.round(), y.round());
            let (mx, my) = maps.get(rx as usize, ry as usize);
            // one canvas pixel maps back to within ~one source pixel
            assert!((mx as f64 - sx).abs() < 1.5, "x: {} vs {}", mx, sx);
            assert!((my as f64 - sy).abs() < 1.5, "y: {} vs {}", my, sy);
        }
    }
}
