use std::fmt;
use std::ops::Not;
use std::sync::Arc;

/// Direction of an incremental search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

/// Case-sensitivity predicate, evaluated on every query.
pub type CaseFilter = Arc<dyn Fn() -> bool + Send + Sync>;

/// A search query: text, direction and an optional live ignore-case filter.
#[derive(Clone, Default)]
pub struct SearchState {
    text: String,
    direction: SearchDirection,
    ignore_case: Option<CaseFilter>,
}

impl SearchState {
    pub fn new(text: impl Into<String>, direction: SearchDirection) -> Self {
        Self {
            text: text.into(),
            direction,
            ignore_case: None,
        }
    }

    pub fn with_ignore_case<F>(mut self, filter: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.ignore_case = Some(Arc::new(filter));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: SearchDirection) {
        self.direction = direction;
    }

    /// Evaluates the filter now; false when none is installed.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case.as_ref().is_some_and(|f| f())
    }

    pub fn ignore_case_filter(&self) -> Option<&CaseFilter> {
        self.ignore_case.as_ref()
    }

    /// Same text and filter (shared, not copied) with the direction flipped.
    pub fn invert(&self) -> Self {
        Self {
            text: self.text.clone(),
            direction: self.direction.reversed(),
            ignore_case: self.ignore_case.clone(),
        }
    }
}

impl Not for &SearchState {
    type Output = SearchState;

    fn not(self) -> SearchState {
        self.invert()
    }
}

impl fmt::Debug for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchState")
            .field("text", &self.text)
            .field("direction", &self.direction)
            .field("ignore_case", &self.ignore_case())
            .finish()
    }
}
