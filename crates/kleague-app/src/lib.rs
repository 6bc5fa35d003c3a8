// Library root: re-exports all modules so integration tests and the binary
// share the loading and composition code.

pub mod dashboard;
pub mod dataset;
pub mod loader;
