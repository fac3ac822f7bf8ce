pub mod log_setup;

pub use log_setup::{setup_logging, setup_test_logging};
