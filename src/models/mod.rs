// Core data models for the task timer
// These structs represent the persisted entities

pub mod task;
pub mod timeslot;

pub use task::*;
pub use timeslot::*;
