#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    LessonUnavailable,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::LessonUnavailable => "Failed to load lesson",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> From<Result<T, ViewError>> for ViewState<T> {
    fn from(result: Result<T, ViewError>) -> Self {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(err) => ViewState::Error(err),
        }
    }
}
