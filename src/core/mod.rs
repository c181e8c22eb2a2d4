// Core utilities shared by the engine subsystems

pub mod math;
