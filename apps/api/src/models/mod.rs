pub mod plan;
pub mod skill;
