#![forbid(unsafe_code)]

pub mod vm;

pub use vm::{ExamScreen, Notice, NoticeKind, map_exam_screen};
