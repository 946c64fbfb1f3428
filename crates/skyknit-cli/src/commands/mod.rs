pub mod check;
pub mod registry;
pub mod select_count;
pub mod shaping;
pub mod simulate;
pub mod tolerance;
pub mod validate_manifest;
