pub mod outbound;
pub mod submission;
