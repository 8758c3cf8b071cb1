pub mod event;
pub mod plan;
pub mod workout;

pub use event::EventRecord;
pub use plan::{GearSection, GrowthCaps, Phase, ScheduleDay};
pub use workout::{Sport, SportFilter, WorkoutRecord};
