mod exam_vm;
mod notice;
mod results_vm;
mod time_fmt;

pub use exam_vm::{
    ExamScreen, FeedbackVm, GradingVm, OptionMark, OptionVm, QuestionVm, UploadVm,
    map_exam_screen,
};
pub use notice::{Notice, NoticeKind};
pub use results_vm::{DetailRowVm, DetailsVm, ResultsVm, map_details, map_results};
pub use time_fmt::{format_datetime, format_elapsed, format_score};
