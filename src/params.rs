//! Configuration structs (spec §6, §9 Builder note).
//!
//! `GeneratePointCloudParameters` and `PCCPatchSegmenter3Parameters` are
//! pure-data value types, following the teacher's `AtlasConfig`/
//! `PointCloudBounds` pattern: plain fields, `Clone`, `serde`
//! (de)serialisable, constructed with `Default` + struct-update syntax
//! rather than a setter-object builder.

use serde::{Deserialize, Serialize};

/// Encoder/decoder-wide parameters shared by the whole pipeline (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePointCloudParameters {
    pub occupancy_resolution: usize,
    pub occupancy_precision: usize,
    pub lossless_geo: bool,
    pub lossless_geo_444: bool,
    pub geometry_bit_depth_3d: u32,
    pub map_count_minus1: usize,
    pub single_map_pixel_interleaving: bool,
    pub enhanced_delta_depth_code: bool,
    pub absolute_d1: bool,
    pub use_eight_orientations: bool,
    pub packing_strategy: u8,
    pub global_patch_allocation: u8,
    pub min_level: u32,
    pub surface_thickness: u32,
    pub minimum_image_width: usize,
    pub minimum_image_height: usize,

    // Smoothing knobs (spec §4.7, supplemented from the original source).
    pub grid_smoothing: bool,
    pub grid_size: u32,
    pub neighbor_count_smoothing: usize,
    pub radius2_smoothing: f64,
    pub radius2_boundary_detection: f64,
    pub threshold_smoothing: f64,
    pub grid_color_smoothing: bool,
    pub cgrid_size: u32,
    pub threshold_color_smoothing: f64,
    pub threshold_color_difference: f64,
    pub threshold_color_variation: f64,
    pub radius2_color_smoothing: f64,
    pub neighbor_count_color_smoothing: usize,
    pub flag_geometry_smoothing: bool,
    pub flag_color_smoothing: bool,

    // PLR / patch-block filter.
    pub plrl_number_of_modes: usize,
    pub patch_size: usize,
    pub pbf_enable_flag: bool,
    pub pbf_passes_count: i16,
    pub pbf_filter_size: i16,
    pub pbf_log2_threshold: i16,
}

impl Default for GeneratePointCloudParameters {
    fn default() -> Self {
        Self {
            occupancy_resolution: 16,
            occupancy_precision: 4,
            lossless_geo: false,
            lossless_geo_444: false,
            geometry_bit_depth_3d: 10,
            map_count_minus1: 1,
            single_map_pixel_interleaving: false,
            enhanced_delta_depth_code: false,
            absolute_d1: false,
            use_eight_orientations: false,
            packing_strategy: 1,
            global_patch_allocation: 0,
            min_level: 1,
            surface_thickness: 4,
            minimum_image_width: 1280,
            minimum_image_height: 1280,

            grid_smoothing: true,
            grid_size: 8,
            neighbor_count_smoothing: 16,
            radius2_smoothing: 64.0,
            radius2_boundary_detection: 64.0,
            threshold_smoothing: 16.0,
            grid_color_smoothing: false,
            cgrid_size: 8,
            threshold_color_smoothing: 9.5,
            threshold_color_difference: 10.0,
            threshold_color_variation: 6.0,
            radius2_color_smoothing: 9.0,
            neighbor_count_color_smoothing: 4,
            flag_geometry_smoothing: true,
            flag_color_smoothing: false,

            plrl_number_of_modes: 4,
            patch_size: 32,
            pbf_enable_flag: false,
            pbf_passes_count: 1,
            pbf_filter_size: 9,
            pbf_log2_threshold: 2,
        }
    }
}

impl GeneratePointCloudParameters {
    /// Validates mutually-exclusive combinations (spec §7 `ConfigurationInvalid`).
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.single_map_pixel_interleaving && self.map_count_minus1 > 0 {
            return Err(crate::error::CodecError::ConfigurationInvalid(
                "single_map_pixel_interleaving requires map_count_minus1 == 0".into(),
            ));
        }
        if self.occupancy_precision > self.occupancy_resolution {
            return Err(crate::error::CodecError::ConfigurationInvalid(
                "occupancy_precision must be <= occupancy_resolution".into(),
            ));
        }
        Ok(())
    }
}

/// Number of candidate projection-orientation vectors to use during
/// segmentation (spec §4.3 item 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrientationCount {
    Six,
    Ten,
    Eighteen,
}

/// Segmentation-only parameters (spec §4.3, §9 Builder note).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSegmenterParameters {
    pub nn_normal_estimation: usize,
    pub grid_based_refine_segmentation: bool,
    pub max_nn_count_refine_segmentation: usize,
    pub iteration_count_refine_segmentation: usize,
    pub voxel_dimension_refine_segmentation: usize,
    pub search_radius_refine_segmentation: usize,
    pub occupancy_resolution: usize,
    pub min_point_count_per_cc_patch_segmentation: usize,
    pub max_nn_count_patch_segmentation: usize,
    pub surface_thickness: u32,
    pub min_level: u32,
    pub max_allowed_dist2_missed_points_selection: f64,
    pub lambda_refine_segmentation: f64,
    pub orientation_count: OrientationCount,
    pub min_weight_epp: f64,
    pub partial_additional_projection_plane: f64,
    pub additional_projection_plane_enabled: bool,
    pub geometry_bit_depth_3d: u32,
}

impl Default for PatchSegmenterParameters {
    fn default() -> Self {
        Self {
            nn_normal_estimation: 16,
            grid_based_refine_segmentation: false,
            max_nn_count_refine_segmentation: 256,
            iteration_count_refine_segmentation: 10,
            voxel_dimension_refine_segmentation: 8,
            search_radius_refine_segmentation: 192,
            occupancy_resolution: 16,
            min_point_count_per_cc_patch_segmentation: 16,
            max_nn_count_patch_segmentation: 16,
            surface_thickness: 4,
            min_level: 1,
            max_allowed_dist2_missed_points_selection: 9.0,
            lambda_refine_segmentation: 3.0,
            orientation_count: OrientationCount::Six,
            min_weight_epp: 0.6,
            partial_additional_projection_plane: 0.0,
            additional_projection_plane_enabled: false,
            geometry_bit_depth_3d: 10,
        }
    }
}
