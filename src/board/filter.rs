use crate::model::actor::Actor;
use crate::model::work_item::{Status, WorkItem};

use super::lists::StatusLists;

/// What the board is narrowed to. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Case-insensitive substring of the title or id.
    pub search: String,
    /// Exact `assigned_to` value.
    pub assignee: Option<String>,
    /// Tickets this actor counts as assigned to, by id or by name.
    pub owner: Option<Actor>,
    pub status: Option<Status>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.assignee.is_none()
            && self.owner.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, item: &WorkItem) -> bool {
        let query = self.search.trim().to_lowercase();
        let text_ok = query.is_empty()
            || item.title.to_lowercase().contains(&query)
            || item.id.to_lowercase().contains(&query);
        let assignee_ok = match &self.assignee {
            Some(a) => item.assigned_to.as_deref() == Some(a.as_str()),
            None => true,
        };
        let owner_ok = self.owner.as_ref().map_or(true, |a| a.is_assignee(item));
        let status_ok = self.status.map_or(true, |s| item.status == s);
        text_ok && assignee_ok && owner_ok && status_ok
    }
}

/// Read-only projection of the board through a [`Filter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredBoard {
    views: [Vec<WorkItem>; 5],
}

impl FilteredBoard {
    pub fn build(lists: &StatusLists, filter: &Filter) -> Self {
        let mut board = Self::default();
        for status in Status::ALL {
            board.views[status.index()] = lists
                .get(status)
                .iter()
                .filter(|item| filter.matches(item))
                .cloned()
                .collect();
        }
        board
    }

    pub fn get(&self, status: Status) -> &[WorkItem] {
        &self.views[status.index()]
    }

    pub fn total(&self) -> usize {
        self.views.iter().map(Vec::len).sum()
    }
}
