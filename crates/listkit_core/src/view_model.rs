use crate::{ListState, RequestState};

/// How items map onto sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutType {
    /// Every item is a row of section 0.
    #[default]
    OneSection,
    /// Every item gets its own section with a single row.
    MultiSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListViewModel {
    pub item_count: usize,
    pub total_count: Option<usize>,
    pub has_more_data: bool,
    pub is_requesting: bool,
    pub request_state: RequestState,
    pub search_mode: bool,
    pub search_keyword: String,
    pub next_page: u32,
    pub layout: LayoutType,
    pub dirty: bool,
}

/// Index-based queries a rendering layer issues against a list.
pub trait ListBinding<T> {
    fn section_count(&self) -> usize;
    fn row_count(&self, section: usize) -> usize;
    fn item(&self, section: usize, row: usize) -> Option<&T>;
}

impl<T> ListBinding<T> for ListState<T> {
    fn section_count(&self) -> usize {
        match self.layout() {
            LayoutType::OneSection => 1,
            LayoutType::MultiSection => self.items().len(),
        }
    }

    fn row_count(&self, section: usize) -> usize {
        match self.layout() {
            LayoutType::OneSection if section == 0 => self.items().len(),
            LayoutType::OneSection => 0,
            LayoutType::MultiSection if section < self.items().len() => 1,
            LayoutType::MultiSection => 0,
        }
    }

    fn item(&self, section: usize, row: usize) -> Option<&T> {
        let index = match self.layout() {
            LayoutType::OneSection => row,
            LayoutType::MultiSection => section,
        };
        self.item_at_index(index)
    }
}
