pub mod prober_tests;
pub mod scheduler_tests;
