//! Render feature configuration.

use serde::{Deserialize, Serialize};

/// Feature toggles and sample counts threaded through the whole pipeline.
///
/// Unknown fields in a config file are rejected; missing fields fall back
/// to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Features {
    /// Cast shadow rays toward light samples.
    pub shadows: bool,
    /// Attenuate shadow rays through transparent occluders instead of
    /// treating every occluder as opaque.
    pub transparency: bool,
    /// Recurse along perfect mirror reflections.
    pub reflections: bool,
    /// Replace the perfect mirror with a sampled glossy lobe.
    pub glossy_reflection: bool,
    /// Sample the environment map on ray misses.
    pub environment_map: bool,
    /// Read diffuse albedo from material textures.
    pub texture_mapping: bool,
    /// Bilinear instead of nearest texture filtering.
    pub bilinear_filtering: bool,
    /// Samples per area light per shading point.
    pub shadow_samples: u32,
    /// Samples per glossy reflection lobe.
    pub glossy_samples: u32,
    /// Maximum recursion depth for secondary rays.
    pub max_ray_depth: u32,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            shadows: true,
            transparency: false,
            reflections: true,
            glossy_reflection: false,
            environment_map: false,
            texture_mapping: false,
            bilinear_filtering: false,
            shadow_samples: 4,
            glossy_samples: 4,
            max_ray_depth: 5,
        }
    }
}
