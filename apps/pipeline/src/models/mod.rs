pub mod cv;
pub mod events;
pub mod payloads;
