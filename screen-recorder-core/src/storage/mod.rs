pub mod avi_format;
pub mod mjpeg_writer;
