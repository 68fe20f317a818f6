use std::time::Instant;

use tokio::sync::mpsc;

use crate::board::{AppliedMove, BoardManager, Filter, Move, RollbackOutcome};
use crate::event::KeyAction;
use crate::model::actor::Actor;
use crate::model::work_item::{Status, WorkItem};

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    MoveConfirmed(AppliedMove),
    MoveFailed(AppliedMove, String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    ConfirmDelete(String),
}

pub struct App {
    pub board: BoardManager,
    pub column: Status,
    pub selected_row: usize,
    pub input_mode: InputMode,
    pub search_input: String,
    pub mine_only: bool,
    pub actor: Option<Actor>,
    pub loading: bool,
    pub moves_in_flight: usize,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(board: BoardManager, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        let actor = board.actors().current_actor().ok();
        Self {
            board,
            column: Status::Todo,
            selected_row: 0,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            mine_only: false,
            actor,
            loading: true,
            moves_in_flight: 0,
            flash_message: None,
            should_quit: false,
            action_tx,
        }
    }

    pub async fn update(&mut self, action: Action) {
        // Clear flash message after 4 seconds
        if let Some((_, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= 4 {
                self.flash_message = None;
            }
        }

        match action {
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => {}
            Action::MoveConfirmed(applied) => {
                self.moves_in_flight = self.moves_in_flight.saturating_sub(1);
                tracing::debug!(item = %applied.item_id, "move confirmed");
            }
            Action::MoveFailed(applied, error) => {
                self.moves_in_flight = self.moves_in_flight.saturating_sub(1);
                match self.board.rollback(&applied) {
                    RollbackOutcome::Restored => {
                        self.flash(format!(
                            "Move of {} failed, reverted: {error}",
                            applied.item_id
                        ));
                        self.follow(&applied.item_id);
                    }
                    RollbackOutcome::Superseded => {
                        self.flash(format!(
                            "Earlier move of {} failed: {error}",
                            applied.item_id
                        ));
                    }
                }
                self.clamp_selection();
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    async fn handle_key(&mut self, key: KeyAction) {
        match self.input_mode.clone() {
            InputMode::Search => self.handle_search_key(key),
            InputMode::ConfirmDelete(id) => {
                self.input_mode = InputMode::Normal;
                if key == KeyAction::Char('y') {
                    self.delete(&id).await;
                } else {
                    self.flash("Delete cancelled");
                }
            }
            InputMode::Normal => self.handle_normal_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up | KeyAction::Char('k') => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyAction::Down | KeyAction::Char('j') => {
                let len = self.board.filtered(self.column).len();
                if self.selected_row + 1 < len {
                    self.selected_row += 1;
                }
            }
            KeyAction::Left | KeyAction::Char('h') => {
                if let Some(prev) = self.column.prev() {
                    self.column = prev;
                    self.clamp_selection();
                }
            }
            KeyAction::Right | KeyAction::Char('l') => {
                if let Some(next) = self.column.next() {
                    self.column = next;
                    self.clamp_selection();
                }
            }
            KeyAction::MoveLeft | KeyAction::Char('H') => {
                if let Some(prev) = self.column.prev() {
                    self.move_selected_to(prev);
                }
            }
            KeyAction::MoveRight | KeyAction::Char('L') => {
                if let Some(next) = self.column.next() {
                    self.move_selected_to(next);
                }
            }
            KeyAction::MoveUp | KeyAction::Char('K') => self.reorder_selected(-1),
            KeyAction::MoveDown | KeyAction::Char('J') => self.reorder_selected(1),
            KeyAction::Char('/') => {
                self.input_mode = InputMode::Search;
            }
            KeyAction::Char('m') => self.toggle_mine(),
            KeyAction::Char('r') => self.refresh().await,
            KeyAction::Char('d') => {
                if let Some(item) = self.selected_item() {
                    let id = item.id.clone();
                    self.flash(format!("Delete {id}? y to confirm"));
                    self.input_mode = InputMode::ConfirmDelete(id);
                }
            }
            KeyAction::Escape => {
                self.search_input.clear();
                self.mine_only = false;
                self.apply_filter();
            }
            KeyAction::Char('q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Char(c) => {
                self.search_input.push(c);
                self.apply_filter();
            }
            KeyAction::Backspace => {
                self.search_input.pop();
                self.apply_filter();
            }
            KeyAction::Select => {
                self.input_mode = InputMode::Normal;
            }
            KeyAction::Escape => {
                self.search_input.clear();
                self.input_mode = InputMode::Normal;
                self.apply_filter();
            }
            _ => {}
        }
    }

    pub fn selected_item(&self) -> Option<&WorkItem> {
        self.board.filtered(self.column).get(self.selected_row)
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.board.load_all().await {
            Ok(0) => self.flash("Board is empty"),
            Ok(count) => {
                self.flash(format!("Loaded {count} tickets"));
            }
            Err(e) => {
                self.flash(format!("Load failed: {e}"));
            }
        }
        self.loading = false;
        self.clamp_selection();
    }

    fn toggle_mine(&mut self) {
        if self.actor.is_none() {
            self.flash("Not signed in");
            return;
        }
        self.mine_only = !self.mine_only;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let filter = Filter {
            search: self.search_input.clone(),
            owner: self.actor.clone().filter(|_| self.mine_only),
            ..Default::default()
        };
        self.board.apply_filter(filter);
        self.clamp_selection();
    }

    /// Moves the selected ticket to the top of `to`, then confirms with the
    /// backend in the background.
    fn move_selected_to(&mut self, to: Status) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let mv = Move {
            item_id: item.id.clone(),
            from: self.column,
            to,
            index: 0,
        };

        match self.board.begin_move(&mv) {
            Ok(Some(applied)) => {
                self.column = to;
                self.follow(&applied.item_id);
                self.spawn_confirm(applied);
            }
            Ok(None) => {}
            Err(e) => self.flash(e.to_string()),
        }
    }

    fn reorder_selected(&mut self, delta: isize) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let id = item.id.clone();
        let Some(current) = self.board.lists().position(self.column, &id) else {
            return;
        };
        let Some(index) = current.checked_add_signed(delta) else {
            return;
        };
        let mv = Move {
            item_id: id.clone(),
            from: self.column,
            to: self.column,
            index,
        };
        match self.board.begin_move(&mv) {
            Ok(Some(_)) => self.follow(&id),
            Ok(None) => {}
            Err(e) => self.flash(e.to_string()),
        }
    }

    fn spawn_confirm(&mut self, applied: AppliedMove) {
        self.moves_in_flight += 1;
        let backend = self.board.backend();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match backend.update_status(&applied.item_id, applied.to).await {
                Ok(_) => Action::MoveConfirmed(applied),
                Err(e) => Action::MoveFailed(applied, format!("{e:#}")),
            };
            let _ = tx.send(action);
        });
    }

    async fn delete(&mut self, id: &str) {
        match self.board.delete(id).await {
            Ok(()) => self.flash(format!("Deleted {id}")),
            Err(e) if e.is_remote() => self.flash(format!("Delete failed on server: {e}")),
            Err(e) => self.flash(e.to_string()),
        }
        self.clamp_selection();
    }

    /// Puts the cursor on `id` if it is visible.
    fn follow(&mut self, id: &str) {
        if let Some((status, _)) = self.board.lists().locate(id) {
            if let Some(row) = self.board.filtered(status).iter().position(|i| i.id == id) {
                self.column = status;
                self.selected_row = row;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.board.filtered(self.column).len();
        if self.selected_row >= len {
            self.selected_row = len.saturating_sub(1);
        }
    }

    fn flash(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), Instant::now()));
    }
}
