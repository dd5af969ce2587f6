pub mod bodies;
pub mod breach;
pub mod combat;
pub mod damage;
pub mod formation;
pub mod memory;
pub mod mode;
pub mod plan;
pub mod squad;
pub mod step;
pub mod tower;
