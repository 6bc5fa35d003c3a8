// Library root: event model, derived metrics, formation inference and the
// rollups consumed by the dashboard and chat layers.

pub mod absence;
pub mod aggregate;
pub mod config;
pub mod event;
pub mod fixture;
pub mod formation;
pub mod metrics;
pub mod roster;
pub mod summary;
pub mod teams;
