//! Background job scheduler and job implementations.

mod alert_matcher;
mod scheduler;

pub use alert_matcher::AlertMatcherJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
