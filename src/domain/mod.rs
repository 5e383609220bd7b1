pub mod category;
pub mod composer;
pub mod priority;
pub mod submission;
pub mod task;
