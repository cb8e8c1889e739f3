// Course listing, preview stats and free-preview gating.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Course, Module};

pub const DEFAULT_PAGE_SIZE: u32 = 8;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Query string for `GET /courses`. Changing any filter returns to page 1.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CourseQuery {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            sort: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CourseQuery {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self { search: search.into(), page: 1, ..self }
    }

    pub fn with_category(self, category: Option<Category>) -> Self {
        Self { category, page: 1, ..self }
    }

    pub fn with_sort(self, sort: SortOrder) -> Self {
        Self { sort, page: 1, ..self }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page: page.max(1), ..self }
    }

    /// The query for the following page, if the listing has one.
    pub fn next_page(&self, pagination: &Pagination) -> Option<Self> {
        (self.page < pagination.pages).then(|| self.clone().with_page(self.page + 1))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CoursePage {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseStats {
    pub milestones: usize,
    pub modules: usize,
    pub free_modules: usize,
    pub duration_minutes: u64,
}

pub fn course_stats(course: &Course) -> CourseStats {
    let modules = || course.milestones.iter().flat_map(|m| m.modules.iter());
    CourseStats {
        milestones: course.milestones.len(),
        modules: modules().count(),
        free_modules: modules().filter(|m| m.is_free).count(),
        duration_minutes: modules().map(|m| u64::from(m.duration)).sum(),
    }
}

/// Free modules are watchable on the course page before purchase.
pub fn can_watch(module: &Module, enrolled: bool) -> bool {
    enrolled || module.is_free
}
