pub mod attendance;
pub mod department;
pub mod holiday;
pub mod leave;
pub mod leave_type;
pub mod notification;
pub mod payslip;
pub mod project;
pub mod time_entry;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

/// Page-numbered pagination, 1-based. Out-of-range pages come back empty
/// rather than erroring.
#[derive(Debug, Deserialize, IntoParams)]
pub struct Pagination {
    #[param(example = 1)]
    pub page: Option<usize>,
    #[param(example = 20)]
    pub per_page: Option<usize>,
}

impl Pagination {
    pub fn slice<T: Clone>(&self, items: &[T]) -> (Vec<T>, usize, usize, usize) {
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let page = self.page.unwrap_or(1).max(1);
        let start = (page - 1).saturating_mul(per_page);
        let data = items.iter().skip(start).take(per_page).cloned().collect();
        (data, items.len(), page, per_page)
    }
}
