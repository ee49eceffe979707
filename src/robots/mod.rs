//! Robots.txt handling module
//!
//! Honoring robots.txt is optional (`respect-robots`). When enabled, every
//! listing and detail URL is checked before it is fetched.

mod cache;
mod parser;

pub use cache::RobotsGate;
pub use parser::ParsedRobots;
