#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod session;
pub mod time;

pub use time::Clock;
