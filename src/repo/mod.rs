pub mod store;
pub mod task;
pub mod timeslot;

pub use store::*;
pub use task::*;
pub use timeslot::*;
