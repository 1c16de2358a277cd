pub mod extraction;
pub mod handlers;
pub mod outcome;
pub mod pipeline;
pub mod schedule;
