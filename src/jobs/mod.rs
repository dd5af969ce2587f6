pub mod actions;
pub mod orders;
pub mod squad_combat;
