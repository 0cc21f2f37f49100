//! Image codec and transform collaborators used by the pipeline stages.
//!
//! - **codec**: decode from disk, encode by output extension
//! - **transform**: bounding-box resize and greyscale conversion

pub mod codec;
pub mod transform;

pub use codec::{decode, encode, ensure_parent_dir, EncodeFormat};
pub use transform::{fit_within, resize_to_bounding_box, to_grayscale, BoundingBox};
