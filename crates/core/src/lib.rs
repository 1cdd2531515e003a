#![forbid(unsafe_code)]

pub mod capture;
pub mod model;
pub mod time;

pub use capture::{AnswerCapture, CaptureError};
pub use time::Clock;
