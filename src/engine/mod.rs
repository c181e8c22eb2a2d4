// Engine modules: physics and the fixed-step loop that drives it

pub mod game_loop;
pub mod physics;
