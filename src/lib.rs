// 2D arena physics: bodies, broad/narrow phase, resolution and ray queries

pub mod core;
pub mod engine;
