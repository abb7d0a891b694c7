//! Process-wide tracing setup shared by the sitemon binaries.

mod subscriber;

pub use subscriber::{LogFormat, init_tracing, init_tracing_with_level};
