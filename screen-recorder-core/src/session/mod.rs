pub mod control;
pub mod frame_loop;
pub mod recorder;
