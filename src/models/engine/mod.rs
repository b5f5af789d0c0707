pub mod constants;
pub mod hit_window;
pub mod note;
pub mod vec3;

pub use constants::*;
pub use hit_window::{Contact, HitZone};
pub use note::{CutDirection, HandSide, Note};
pub use vec3::Vec3;
