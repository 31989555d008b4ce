pub mod capture_source;
pub mod observer;
pub mod video_encoder;
