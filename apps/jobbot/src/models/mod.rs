pub mod application;
pub mod job;

pub use application::{ApplicationRecord, ApplicationStatus};
pub use job::JobListing;
