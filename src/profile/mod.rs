// Profile module
// Bed elevation profiles sampled along a survey line

pub mod data;

pub use data::{Profile, ProfileError};
