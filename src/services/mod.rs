pub mod bucket_resolver;
pub mod task_tracker;

pub use bucket_resolver::{BucketResolver, SectionDirectory};
pub use task_tracker::TaskTrackerService;
