pub mod scan_controller;
pub mod scan_driver;
pub mod tracking_service;

#[cfg(test)]
pub(crate) mod fakes;

pub use scan_controller::{ScanController, Step};
pub use scan_driver::run_session;
pub use tracking_service::{EditReport, Toast, ToastLevel, TrackingService};
