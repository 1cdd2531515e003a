use services::{ErrorClass, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// Shown next to the control that caused it.
    Inline,
    /// Shown as a banner the user can dismiss; the action may be retried.
    Dismissible,
}

/// User-facing message for a failed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// `None` for errors the user never needs to see, like stale responses.
    #[must_use]
    pub fn from_error(err: &SessionError) -> Option<Self> {
        if matches!(err, SessionError::StaleResponse { .. }) {
            return None;
        }
        let notice = match err.class() {
            ErrorClass::Validation => Self {
                kind: NoticeKind::Inline,
                message: err.to_string(),
            },
            ErrorClass::Protocol => Self {
                kind: NoticeKind::Dismissible,
                message: err.to_string(),
            },
            ErrorClass::MalformedData => Self {
                kind: NoticeKind::Dismissible,
                message: format!("The document could not be used: {err}"),
            },
        };
        Some(notice)
    }
}
