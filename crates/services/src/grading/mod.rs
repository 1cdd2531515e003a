mod adapter;
mod http;
mod protocol;
mod reference;

pub use adapter::{Grader, GradingAdapter};
pub use http::HttpGrader;
pub use protocol::{GradedQuestion, GradingRequest, GradingResponse};
pub use reference::ReferenceGrader;
