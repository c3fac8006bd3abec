pub mod frame_gate;
pub mod level_meter;
pub mod painter;
