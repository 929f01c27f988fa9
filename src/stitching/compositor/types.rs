use crate::stitching::camera::FocalConvention;
use crate::stitching::exposure::CompensationMode;

/// Default floor for the per-pixel weight sum
pub const DEFAULT_WEIGHT_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitcherConfig {
    pub compensation: CompensationMode,
    pub focal_convention: FocalConvention,
    pub weight_epsilon: f32,
    /// Reject images whose size differs from their camera's resolution
    pub validate_dimensions: bool,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            compensation: CompensationMode::None,
            focal_convention: FocalConvention::Negated,
            weight_epsilon: DEFAULT_WEIGHT_EPSILON,
            validate_dimensions: true,
        }
    }
}

impl StitcherConfig {
    pub fn builder() -> StitcherConfigBuilder {
        StitcherConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct StitcherConfigBuilder {
    compensation: Option<CompensationMode>,
    focal_convention: Option<FocalConvention>,
    weight_epsilon: Option<f32>,
    validate_dimensions: Option<bool>,
}

impl StitcherConfigBuilder {
    pub fn compensation(mut self, compensation: CompensationMode) -> Self {
        self.compensation = Some(compensation);
        self
    }

    pub fn focal_convention(mut self, convention: FocalConvention) -> Self {
        self.focal_convention = Some(convention);
        self
    }

    pub fn weight_epsilon(mut self, epsilon: f32) -> Self {
        self.weight_epsilon = Some(epsilon);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> StitcherConfig {
        let default = StitcherConfig::default();
        StitcherConfig {
            compensation: self.compensation.unwrap_or(default.compensation),
            focal_convention: self.focal_convention.unwrap_or(default.focal_convention),
            weight_epsilon: self.weight_epsilon.unwrap_or(default.weight_epsilon),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
