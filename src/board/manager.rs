use std::sync::Arc;

use anyhow::anyhow;

use super::filter::{Filter, FilteredBoard};
use super::lists::StatusLists;
use crate::backend::{ActorSource, Backend};
use crate::error::BoardError;
use crate::model::work_item::{ItemPatch, NewItem, Status, WorkItem};

/// A drag of one ticket: from a column to a slot in another (or the same) column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub item_id: String,
    pub from: Status,
    pub to: Status,
    pub index: usize,
}

/// A move that has been applied locally. Carries what [`BoardManager::rollback`]
/// needs to undo it.
///
/// `above` and `below` are the ids of the ticket's neighbours in the source
/// column at the time of the move. Rollback reinserts relative to them, so
/// other moves out of the same column can settle in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub item_id: String,
    pub from: Status,
    pub from_index: usize,
    pub above: Option<String>,
    pub below: Option<String>,
    pub to: Status,
    pub to_index: usize,
}

impl AppliedMove {
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing to do: unknown ticket, or it is already in that slot.
    Unchanged,
    /// Order changed within one column. Order is local, nothing is sent.
    Reordered(AppliedMove),
    /// Status changed and the backend confirmed it.
    Moved(AppliedMove),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    Restored,
    /// The ticket was moved again (or removed) before the failure came back;
    /// the newer state is left alone.
    Superseded,
}

/// Owns the local copy of the board and keeps it in step with the backend.
pub struct BoardManager {
    backend: Arc<dyn Backend>,
    actors: Box<dyn ActorSource>,
    lists: StatusLists,
    filter: Filter,
    filtered: FilteredBoard,
}

impl BoardManager {
    pub fn new(backend: Arc<dyn Backend>, actors: Box<dyn ActorSource>) -> Self {
        Self {
            backend,
            actors,
            lists: StatusLists::default(),
            filter: Filter::default(),
            filtered: FilteredBoard::default(),
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn actors(&self) -> &dyn ActorSource {
        self.actors.as_ref()
    }

    pub fn lists(&self) -> &StatusLists {
        &self.lists
    }

    pub fn list(&self, status: Status) -> &[WorkItem] {
        self.lists.get(status)
    }

    pub fn filtered(&self, status: Status) -> &[WorkItem] {
        self.filtered.get(status)
    }

    pub fn filtered_board(&self) -> &FilteredBoard {
        &self.filtered
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn find(&self, id: &str) -> Option<&WorkItem> {
        self.lists.find(id)
    }

    /// Replaces the whole board with a fresh fetch. On failure the board is
    /// left empty rather than half-loaded.
    pub async fn load_all(&mut self) -> Result<usize, BoardError> {
        match self.backend.fetch_items().await {
            Ok(items) => {
                self.lists = StatusLists::partition(items);
                self.refilter();
                tracing::debug!(count = self.lists.len(), backend = self.backend.name(), "board loaded");
                Ok(self.lists.len())
            }
            Err(e) => {
                self.lists = StatusLists::default();
                self.refilter();
                tracing::warn!(error = %e, "board load failed");
                Err(BoardError::Remote(e))
            }
        }
    }

    pub fn apply_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = FilteredBoard::build(&self.lists, &self.filter);
    }

    /// Applies `mv` locally without talking to the backend.
    ///
    /// Returns `None` when there is nothing to do. A status change is only
    /// allowed for admins and the ticket's assignee; a refusal leaves the
    /// board untouched.
    pub fn begin_move(&mut self, mv: &Move) -> Result<Option<AppliedMove>, BoardError> {
        let Some(from_index) = self.lists.position(mv.from, &mv.item_id) else {
            tracing::debug!(item = %mv.item_id, from = %mv.from, "move of ticket not in source column ignored");
            return Ok(None);
        };

        if mv.from != mv.to {
            let actor = self.actors.current_actor()?;
            let item = &self.lists.get(mv.from)[from_index];
            if !actor.can_move(item) {
                tracing::debug!(item = %mv.item_id, actor = %actor, "move refused");
                return Err(BoardError::PermissionDenied {
                    actor: actor.to_string(),
                    item: mv.item_id.clone(),
                });
            }
        } else {
            let last = self.lists.get(mv.from).len() - 1;
            if mv.index.min(last) == from_index {
                return Ok(None);
            }
        }

        let source = self.lists.get(mv.from);
        let above = from_index.checked_sub(1).map(|i| source[i].id.clone());
        let below = source.get(from_index + 1).map(|i| i.id.clone());

        let mut item = self.lists.remove(mv.from, from_index);
        item.status = mv.to;
        let to_index = self.lists.insert(mv.index, item);
        self.refilter();

        Ok(Some(AppliedMove {
            item_id: mv.item_id.clone(),
            from: mv.from,
            from_index,
            above,
            below,
            to: mv.to,
            to_index,
        }))
    }

    /// Undoes `applied`: the ticket goes back to its old column, status, and slot.
    ///
    /// If the ticket is no longer in the column the move put it in, a later
    /// operation has already overtaken this one and nothing is changed.
    pub fn rollback(&mut self, applied: &AppliedMove) -> RollbackOutcome {
        let Some(current) = self.lists.position(applied.to, &applied.item_id) else {
            tracing::warn!(item = %applied.item_id, to = %applied.to, "rollback superseded by a later change");
            return RollbackOutcome::Superseded;
        };

        let mut item = self.lists.remove(applied.to, current);
        item.status = applied.from;
        let index = self.restore_index(applied);
        self.lists.insert(index, item);
        self.refilter();
        tracing::warn!(item = %applied.item_id, from = %applied.from, to = %applied.to, "move rolled back");
        RollbackOutcome::Restored
    }

    /// Where a rolled-back ticket goes in its old column: in front of its old
    /// lower neighbour, else behind its old upper one, else the bottom if it
    /// was last. The raw index is the last resort when both neighbours left.
    fn restore_index(&self, applied: &AppliedMove) -> usize {
        let position = |id: &String| self.lists.position(applied.from, id);
        if let Some(idx) = applied.below.as_ref().and_then(position) {
            return idx;
        }
        if let Some(idx) = applied.above.as_ref().and_then(position) {
            return idx + 1;
        }
        match applied.below {
            None => self.lists.get(applied.from).len(),
            Some(_) => applied.from_index,
        }
    }

    /// Optimistic move: apply locally, confirm with the backend, and roll
    /// back if the backend says no.
    pub async fn move_item(&mut self, mv: Move) -> Result<MoveOutcome, BoardError> {
        let Some(applied) = self.begin_move(&mv)? else {
            return Ok(MoveOutcome::Unchanged);
        };
        if !applied.changes_status() {
            return Ok(MoveOutcome::Reordered(applied));
        }

        match self.backend.update_status(&applied.item_id, applied.to).await {
            Ok(_) => {
                tracing::debug!(item = %applied.item_id, from = %applied.from, to = %applied.to, "move confirmed");
                Ok(MoveOutcome::Moved(applied))
            }
            Err(source) => {
                self.rollback(&applied);
                Err(BoardError::MoveFailed {
                    item: applied.item_id,
                    status: applied.to,
                    source,
                })
            }
        }
    }

    /// Creates a ticket remotely and puts it at the top of its column.
    pub async fn create(&mut self, item: NewItem) -> Result<WorkItem, BoardError> {
        let created = self.backend.create_item(&item).await?;
        self.lists.remove_by_id(&created.id);
        self.lists.prepend(created.clone());
        self.refilter();
        tracing::info!(item = %created.id, status = %created.status, "ticket created");
        Ok(created)
    }

    /// Sends `patch` and moves the returned ticket to the top of its column.
    ///
    /// A patch that changes the status is held to the same rule as a move.
    pub async fn update(&mut self, id: &str, patch: ItemPatch) -> Result<WorkItem, BoardError> {
        let Some(current) = self.lists.find(id) else {
            return Err(BoardError::NotFound(id.to_string()));
        };
        if patch.status.is_some_and(|s| s != current.status) {
            let actor = self.actors.current_actor()?;
            if !actor.can_move(current) {
                tracing::debug!(item = %id, actor = %actor, "status edit refused");
                return Err(BoardError::PermissionDenied {
                    actor: actor.to_string(),
                    item: id.to_string(),
                });
            }
        }
        let updated = self.backend.update_item(id, &patch).await?;
        self.lists.remove_by_id(id);
        self.lists.remove_by_id(&updated.id);
        self.lists.prepend(updated.clone());
        self.refilter();
        tracing::info!(item = %updated.id, status = %updated.status, "ticket updated");
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), BoardError> {
        if self.lists.find(id).is_none() {
            return Err(BoardError::NotFound(id.to_string()));
        }
        if !self.backend.delete_item(id).await? {
            return Err(BoardError::Remote(anyhow!(
                "backend did not acknowledge deleting ticket {id}"
            )));
        }
        self.lists.remove_by_id(id);
        self.refilter();
        tracing::info!(item = %id, "ticket deleted");
        Ok(())
    }

    /// Reassigns a ticket; it keeps its slot unless the backend also changed its status.
    pub async fn assign(&mut self, id: &str, assignee: &str) -> Result<WorkItem, BoardError> {
        if self.lists.find(id).is_none() {
            return Err(BoardError::NotFound(id.to_string()));
        }
        let updated = self.backend.assign_item(id, assignee).await?;
        self.lists.replace(updated.clone());
        self.refilter();
        tracing::info!(item = %id, assignee, "ticket assigned");
        Ok(updated)
    }
}
