pub mod color;
pub mod pacing;
