//! Test data fixtures

pub mod fixtures;

pub use fixtures::ExperienceFactory;
