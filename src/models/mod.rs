pub mod common;
pub mod content;
pub mod image;
pub mod settings;

pub use common::*;
pub use content::*;
pub use image::*;
pub use settings::*;
