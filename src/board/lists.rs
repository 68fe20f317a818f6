use std::collections::HashSet;

use crate::model::work_item::{Status, WorkItem};

/// The five ordered columns of the board, indexed by [`Status::index`].
///
/// Every mutator keeps the membership rule: an item sits in exactly one
/// list, the one matching its `status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusLists {
    lists: [Vec<WorkItem>; 5],
}

impl StatusLists {
    /// Single pass over `items`; relative order within a status is preserved.
    pub fn partition(items: Vec<WorkItem>) -> Self {
        let mut lists = Self::default();
        for item in items {
            lists.lists[item.status.index()].push(item);
        }
        lists
    }

    pub fn get(&self, status: Status) -> &[WorkItem] {
        &self.lists[status.index()]
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    pub fn position(&self, status: Status, id: &str) -> Option<usize> {
        self.get(status).iter().position(|i| i.id == id)
    }

    /// Column and index of the item with `id`, wherever it is.
    pub fn locate(&self, id: &str) -> Option<(Status, usize)> {
        Status::ALL
            .iter()
            .find_map(|s| self.position(*s, id).map(|idx| (*s, idx)))
    }

    pub fn find(&self, id: &str) -> Option<&WorkItem> {
        self.locate(id).map(|(s, idx)| &self.lists[s.index()][idx])
    }

    pub(crate) fn remove(&mut self, status: Status, index: usize) -> WorkItem {
        self.lists[status.index()].remove(index)
    }

    /// Inserts into the list named by `item.status`, clamping `index` to the
    /// list length. Returns where the item landed.
    pub(crate) fn insert(&mut self, index: usize, item: WorkItem) -> usize {
        let list = &mut self.lists[item.status.index()];
        let index = index.min(list.len());
        list.insert(index, item);
        index
    }

    pub(crate) fn prepend(&mut self, item: WorkItem) {
        self.insert(0, item);
    }

    pub(crate) fn remove_by_id(&mut self, id: &str) -> Option<WorkItem> {
        let (status, idx) = self.locate(id)?;
        Some(self.remove(status, idx))
    }

    /// Swaps in a fresh copy of an item. Keeps its slot when the status is
    /// unchanged, otherwise it goes to the top of its new column.
    pub(crate) fn replace(&mut self, item: WorkItem) {
        match self.locate(&item.id) {
            Some((status, idx)) if status == item.status => {
                self.lists[status.index()][idx] = item;
            }
            Some((status, idx)) => {
                self.remove(status, idx);
                self.prepend(item);
            }
            None => self.prepend(item),
        }
    }

    /// Checks the membership rule and id uniqueness.
    pub fn check_invariant(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for status in Status::ALL {
            for item in self.get(status) {
                if item.status != status {
                    return Err(format!(
                        "ticket {} has status {} but sits in {}",
                        item.id, item.status, status
                    ));
                }
                if !seen.insert(item.id.as_str()) {
                    return Err(format!("ticket {} appears more than once", item.id));
                }
            }
        }
        Ok(())
    }
}
