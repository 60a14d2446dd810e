pub mod core;
pub mod dashboard;
pub mod grades;
pub mod homework;
pub mod roster;
pub mod schedule;
pub mod session;
