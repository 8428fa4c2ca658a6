pub mod control;
pub mod state;
