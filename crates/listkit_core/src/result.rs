use crate::ListError;

/// Which public operation started a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// First page, replaces the item list.
    Refresh,
    /// Next page, appends to the item list.
    Fetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    None,
    Requesting(RequestType),
}

/// Which injected capability served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Listing,
    Search,
}

/// Result of one page request.
///
/// `total_count` is the server-reported total across all pages, not the
/// length of `items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState<T> {
    Success { total_count: usize, items: Vec<T> },
    Error(ListError),
}

impl<T> ResultState<T> {
    pub fn success(total_count: usize, items: Vec<T>) -> Self {
        Self::Success { total_count, items }
    }

    pub fn error(err: ListError) -> Self {
        Self::Error(err)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn as_error(&self) -> Option<&ListError> {
        match self {
            Self::Error(err) => Some(err),
            Self::Success { .. } => None,
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Success { items, .. } => items,
            Self::Error(_) => &[],
        }
    }

    /// Maps every item, keeping totals and errors untouched.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultState<U> {
        match self {
            Self::Success { total_count, items } => ResultState::Success {
                total_count,
                items: items.into_iter().map(f).collect(),
            },
            Self::Error(err) => ResultState::Error(err),
        }
    }
}

impl<T, E> From<Result<(usize, Vec<T>), E>> for ResultState<T>
where
    E: Into<ListError>,
{
    fn from(result: Result<(usize, Vec<T>), E>) -> Self {
        match result {
            Ok((total_count, items)) => Self::Success { total_count, items },
            Err(err) => Self::Error(err.into()),
        }
    }
}

/// One entry on the outcome channel: every request attempt, including
/// rejected, superseded and cancelled ones, produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub kind: RequestType,
    pub result: ResultState<T>,
}

impl<T> Outcome<T> {
    pub fn new(kind: RequestType, result: ResultState<T>) -> Self {
        Self { kind, result }
    }

    pub(crate) fn rejected(kind: RequestType, err: ListError) -> Self {
        Self {
            kind,
            result: ResultState::Error(err),
        }
    }
}
