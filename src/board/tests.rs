use std::sync::Arc;

use super::*;
use crate::backend::tests::{make_work_item, MockBackend};
use crate::backend::Backend;
use crate::error::BoardError;
use crate::model::actor::{Actor, Role};
use crate::model::work_item::{ItemPatch, NewItem, Priority, Status, WorkItem};

fn admin() -> Actor {
    Actor {
        id: "1".into(),
        name: Some("root".into()),
        role: Role::Admin,
    }
}

fn user(id: &str) -> Actor {
    Actor {
        id: id.into(),
        name: None,
        role: Role::User,
    }
}

/// Five tickets, two of them in todo.
fn five_items() -> Vec<WorkItem> {
    vec![
        make_work_item("1", Status::Todo, Some("7")),
        make_work_item("2", Status::Todo, Some("8")),
        make_work_item("3", Status::InProgress, Some("7")),
        make_work_item("4", Status::Testing, None),
        make_work_item("5", Status::Done, Some("8")),
    ]
}

async fn loaded(backend: MockBackend, actor: Actor) -> (BoardManager, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let dyn_backend: Arc<dyn Backend> = backend.clone();
    let mut board = BoardManager::new(dyn_backend, Box::new(actor));
    board.load_all().await.unwrap();
    backend.calls.lock().unwrap().clear();
    (board, backend)
}

fn ids(list: &[WorkItem]) -> Vec<&str> {
    list.iter().map(|i| i.id.as_str()).collect()
}

fn mv(id: &str, from: Status, to: Status, index: usize) -> Move {
    Move {
        item_id: id.into(),
        from,
        to,
        index,
    }
}

#[tokio::test]
async fn move_confirmed_by_backend_sticks() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;

    let outcome = board
        .move_item(mv("1", Status::Todo, Status::InProgress, 0))
        .await
        .unwrap();

    assert!(matches!(outcome, MoveOutcome::Moved(_)));
    assert_eq!(ids(board.list(Status::Todo)), vec!["2"]);
    assert_eq!(ids(board.list(Status::InProgress)), vec!["1", "3"]);
    assert_eq!(board.find("1").unwrap().status, Status::InProgress);
    assert_eq!(backend.calls(), vec!["update_status 1 in_progress"]);
    board.lists().check_invariant().unwrap();
}

#[tokio::test]
async fn move_rejected_by_backend_restores_snapshot() {
    let (mut board, backend) =
        loaded(MockBackend::new(five_items()).fail_on("update_status"), admin()).await;
    let before = board.lists().clone();
    let filtered_before = board.filtered_board().clone();

    let err = board
        .move_item(mv("1", Status::Todo, Status::InProgress, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::MoveFailed { .. }));
    assert!(err.is_remote());
    assert!(format!("{:#}", anyhow::Error::from(err)).contains("500"));
    assert_eq!(board.lists(), &before);
    assert_eq!(board.filtered_board(), &filtered_before);
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn rollback_restores_original_index_not_just_column() {
    let items = vec![
        make_work_item("a", Status::Todo, None),
        make_work_item("b", Status::Todo, None),
        make_work_item("c", Status::Todo, None),
        make_work_item("x", Status::Done, None),
        make_work_item("y", Status::Done, None),
    ];
    let (mut board, _) =
        loaded(MockBackend::new(items).fail_on("update_status"), admin()).await;
    let before = board.lists().clone();

    let result = board.move_item(mv("b", Status::Todo, Status::Done, 1)).await;

    assert!(result.is_err());
    assert_eq!(ids(board.list(Status::Todo)), vec!["a", "b", "c"]);
    assert_eq!(ids(board.list(Status::Done)), vec!["x", "y"]);
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn non_assignee_cannot_move() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), user("99")).await;
    let before = board.lists().clone();

    let err = board
        .move_item(mv("1", Status::Todo, Status::InProgress, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::PermissionDenied { .. }));
    assert!(!err.is_remote());
    assert!(backend.calls().is_empty());
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn assignee_can_move_own_ticket() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), user("7")).await;

    let outcome = board
        .move_item(mv("1", Status::Todo, Status::Done, 5))
        .await
        .unwrap();

    let MoveOutcome::Moved(applied) = outcome else {
        panic!("expected a confirmed move");
    };
    assert_eq!(applied.from_index, 0);
    assert_eq!(applied.to_index, 1);
    assert_eq!(ids(board.list(Status::Done)), vec!["5", "1"]);
}

#[tokio::test]
async fn signed_out_actor_cannot_change_status() {
    let backend = Arc::new(MockBackend::new(five_items()));
    let dyn_backend: Arc<dyn Backend> = backend.clone();
    let mut board = BoardManager::new(dyn_backend, Box::new(crate::backend::token::Anonymous));
    board.load_all().await.unwrap();
    let before = board.lists().clone();

    let err = board
        .move_item(mv("1", Status::Todo, Status::Done, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::Unauthenticated(_)));
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn move_to_current_slot_is_a_noop() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), user("99")).await;
    let before = board.lists().clone();

    let first = board
        .move_item(mv("1", Status::Todo, Status::Todo, 0))
        .await
        .unwrap();
    // Past-the-end in the same column clamps onto the item's own slot.
    let last = board
        .move_item(mv("2", Status::Todo, Status::Todo, 10))
        .await
        .unwrap();

    assert_eq!(first, MoveOutcome::Unchanged);
    assert_eq!(last, MoveOutcome::Unchanged);
    assert!(backend.calls().is_empty());
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn reorder_within_column_is_local_only() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), user("99")).await;

    let outcome = board
        .move_item(mv("2", Status::Todo, Status::Todo, 0))
        .await
        .unwrap();

    assert!(matches!(outcome, MoveOutcome::Reordered(_)));
    assert_eq!(ids(board.list(Status::Todo)), vec!["2", "1"]);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn move_of_unknown_ticket_is_ignored() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;
    let before = board.lists().clone();

    // "3" exists, but not in todo.
    let wrong_column = board
        .move_item(mv("3", Status::Todo, Status::Done, 0))
        .await
        .unwrap();
    let missing = board
        .move_item(mv("nope", Status::Todo, Status::Done, 0))
        .await
        .unwrap();

    assert_eq!(wrong_column, MoveOutcome::Unchanged);
    assert_eq!(missing, MoveOutcome::Unchanged);
    assert!(backend.calls().is_empty());
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn load_partitions_twelve_items_by_status() {
    let statuses = [
        Status::Todo,
        Status::Todo,
        Status::Todo,
        Status::InProgress,
        Status::InProgress,
        Status::Resolved,
        Status::Testing,
        Status::Testing,
        Status::Testing,
        Status::Testing,
        Status::Done,
        Status::Done,
    ];
    let items: Vec<WorkItem> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| make_work_item(&format!("T-{i}"), *s, None))
        .collect();
    let (board, _) = loaded(MockBackend::new(items), admin()).await;

    for status in Status::ALL {
        let expected = statuses.iter().filter(|s| **s == status).count();
        assert_eq!(board.filtered(status).len(), expected, "{status}");
        assert_eq!(board.list(status).len(), expected, "{status}");
    }
    assert_eq!(board.lists().len(), 12);
    board.lists().check_invariant().unwrap();
}

#[tokio::test]
async fn failed_load_empties_the_board() {
    let backend = Arc::new(MockBackend::new(five_items()));
    let dyn_backend: Arc<dyn Backend> = backend.clone();
    let mut board = BoardManager::new(dyn_backend, Box::new(admin()));
    board.load_all().await.unwrap();
    assert_eq!(board.lists().len(), 5);

    backend.set_failing("fetch_items", true);
    let err = board.load_all().await.unwrap_err();

    assert!(err.is_remote());
    assert!(board.lists().is_empty());
    assert_eq!(board.filtered_board().total(), 0);
}

#[tokio::test]
async fn reload_replaces_local_state() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;
    board
        .move_item(mv("2", Status::Todo, Status::Todo, 0))
        .await
        .unwrap();
    backend.stored.lock().unwrap().retain(|i| i.id != "5");

    board.load_all().await.unwrap();

    assert_eq!(ids(board.list(Status::Todo)), vec!["1", "2"]);
    assert!(board.find("5").is_none());
}

#[tokio::test]
async fn filter_is_idempotent_and_tracks_moves() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), admin()).await;
    let filter = Filter {
        assignee: Some("7".into()),
        ..Default::default()
    };

    board.apply_filter(filter.clone());
    let first = board.filtered_board().clone();
    board.apply_filter(filter);
    assert_eq!(board.filtered_board(), &first);
    assert_eq!(first.total(), 2);

    board
        .move_item(mv("1", Status::Todo, Status::Done, 0))
        .await
        .unwrap();
    assert!(board.filtered(Status::Todo).is_empty());
    assert_eq!(ids(board.filtered(Status::Done)), vec!["1"]);
}

// Moves are not serialized per ticket. When a second move of the same ticket
// is applied before the first one's failure arrives, the first rollback finds
// the ticket gone from where it put it and leaves the newer state in place.
#[tokio::test]
async fn late_failure_after_second_move_is_superseded() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), admin()).await;

    let first = board
        .begin_move(&mv("1", Status::Todo, Status::InProgress, 0))
        .unwrap()
        .unwrap();
    let second = board
        .begin_move(&mv("1", Status::InProgress, Status::Done, 0))
        .unwrap()
        .unwrap();
    let after_second = board.lists().clone();

    assert_eq!(board.rollback(&first), RollbackOutcome::Superseded);
    assert_eq!(board.lists(), &after_second);
    assert_eq!(board.find("1").unwrap().status, Status::Done);
    board.lists().check_invariant().unwrap();

    // The second move failing as well lands the ticket back in in_progress,
    // not todo: each rollback only undoes its own step.
    assert_eq!(board.rollback(&second), RollbackOutcome::Restored);
    assert_eq!(board.find("1").unwrap().status, Status::InProgress);
    board.lists().check_invariant().unwrap();
}

// Two tickets leave the same column before either confirm comes back. Both
// fail, in either order, and the column must come back as it was.
#[tokio::test]
async fn two_failed_moves_out_of_one_column_restore_its_order() {
    let items = vec![
        make_work_item("a", Status::Todo, None),
        make_work_item("b", Status::Todo, None),
        make_work_item("c", Status::Todo, None),
        make_work_item("x", Status::InProgress, None),
    ];

    for first_to_fail in [0, 1] {
        let (mut board, _) = loaded(MockBackend::new(items.clone()), admin()).await;
        let before = board.lists().clone();

        let moves = [
            board
                .begin_move(&mv("a", Status::Todo, Status::InProgress, 0))
                .unwrap()
                .unwrap(),
            board
                .begin_move(&mv("b", Status::Todo, Status::InProgress, 0))
                .unwrap()
                .unwrap(),
        ];
        assert_eq!(ids(board.list(Status::Todo)), vec!["c"]);

        let second_to_fail = 1 - first_to_fail;
        assert_eq!(board.rollback(&moves[first_to_fail]), RollbackOutcome::Restored);
        assert_eq!(board.rollback(&moves[second_to_fail]), RollbackOutcome::Restored);

        assert_eq!(board.lists(), &before, "first failure: {first_to_fail}");
        board.lists().check_invariant().unwrap();
    }
}

#[tokio::test]
async fn rollback_of_last_ticket_returns_to_bottom() {
    let items = vec![
        make_work_item("a", Status::Todo, None),
        make_work_item("b", Status::Todo, None),
        make_work_item("c", Status::Todo, None),
    ];
    let (mut board, _) = loaded(MockBackend::new(items), admin()).await;
    let before = board.lists().clone();

    let c = board
        .begin_move(&mv("c", Status::Todo, Status::Done, 0))
        .unwrap()
        .unwrap();
    let b = board
        .begin_move(&mv("b", Status::Todo, Status::Done, 0))
        .unwrap()
        .unwrap();

    board.rollback(&c);
    assert_eq!(ids(board.list(Status::Todo)), vec!["a", "c"]);
    board.rollback(&b);
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn rollback_after_ticket_deleted_is_superseded() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), admin()).await;
    let applied = board
        .begin_move(&mv("1", Status::Todo, Status::Done, 0))
        .unwrap()
        .unwrap();
    board.delete("1").await.unwrap();

    assert_eq!(board.rollback(&applied), RollbackOutcome::Superseded);
    assert!(board.find("1").is_none());
}

#[tokio::test]
async fn create_prepends_to_matching_column() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;
    let mut new = NewItem::new("Broken avatar upload");
    new.status = Status::Testing;
    new.priority = Priority::High;

    let created = board.create(new).await.unwrap();

    assert_eq!(created.status, Status::Testing);
    assert_eq!(board.list(Status::Testing)[0].id, created.id);
    assert_eq!(board.list(Status::Testing).len(), 2);
    assert_eq!(backend.calls(), vec!["create_item Broken avatar upload"]);
    board.lists().check_invariant().unwrap();
}

#[tokio::test]
async fn failed_create_leaves_board_alone() {
    let (mut board, _) =
        loaded(MockBackend::new(five_items()).fail_on("create_item"), admin()).await;
    let before = board.lists().clone();

    let err = board.create(NewItem::new("nope")).await.unwrap_err();

    assert!(matches!(err, BoardError::Remote(_)));
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn update_moves_ticket_to_top_of_new_column() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), admin()).await;
    let patch = ItemPatch {
        title: Some("Renamed".into()),
        status: Some(Status::Done),
        ..Default::default()
    };

    let updated = board.update("2", patch).await.unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(ids(board.list(Status::Todo)), vec!["1"]);
    assert_eq!(ids(board.list(Status::Done)), vec!["2", "5"]);
    board.lists().check_invariant().unwrap();
}

#[tokio::test]
async fn status_edit_needs_move_permission() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), user("99")).await;
    let before = board.lists().clone();

    let status_change = ItemPatch {
        status: Some(Status::Done),
        ..Default::default()
    };
    let err = board.update("1", status_change).await.unwrap_err();
    assert!(matches!(err, BoardError::PermissionDenied { .. }));
    assert!(backend.calls().is_empty());
    assert_eq!(board.lists(), &before);

    // Other fields, or restating the current status, stay open to everyone.
    let rename = ItemPatch {
        title: Some("Renamed".into()),
        status: Some(Status::Todo),
        ..Default::default()
    };
    board.update("1", rename).await.unwrap();
    assert_eq!(backend.calls(), vec!["update_item 1"]);
}

#[tokio::test]
async fn assignee_can_edit_status() {
    let (mut board, _) = loaded(MockBackend::new(five_items()), user("7")).await;
    let patch = ItemPatch {
        status: Some(Status::Resolved),
        ..Default::default()
    };

    board.update("1", patch).await.unwrap();

    assert_eq!(ids(board.list(Status::Resolved)), vec!["1"]);
}

#[tokio::test]
async fn update_of_unknown_ticket_is_not_sent() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;

    let err = board
        .update("missing", ItemPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::NotFound(id) if id == "missing"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_update_leaves_board_alone() {
    let (mut board, _) =
        loaded(MockBackend::new(five_items()).fail_on("update_item"), admin()).await;
    let before = board.lists().clone();

    let patch = ItemPatch {
        status: Some(Status::Done),
        ..Default::default()
    };
    assert!(board.update("1", patch).await.is_err());
    assert_eq!(board.lists(), &before);
}

#[tokio::test]
async fn delete_removes_ticket() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;

    board.delete("4").await.unwrap();

    assert!(board.find("4").is_none());
    assert!(board.list(Status::Testing).is_empty());
    assert_eq!(backend.calls(), vec!["delete_item 4"]);
}

#[tokio::test]
async fn unacknowledged_delete_keeps_ticket() {
    let (mut board, _) =
        loaded(MockBackend::new(five_items()).refusing_deletes(), admin()).await;

    let err = board.delete("4").await.unwrap_err();

    assert!(err.is_remote());
    assert!(board.find("4").is_some());
}

#[tokio::test]
async fn delete_of_unknown_ticket_is_not_found() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;
    assert!(matches!(
        board.delete("zzz").await,
        Err(BoardError::NotFound(_))
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn assign_keeps_slot() {
    let (mut board, backend) = loaded(MockBackend::new(five_items()), admin()).await;

    let updated = board.assign("2", "alice").await.unwrap();

    assert_eq!(updated.assigned_to.as_deref(), Some("alice"));
    assert_eq!(ids(board.list(Status::Todo)), vec!["1", "2"]);
    assert_eq!(
        board.find("2").unwrap().assigned_to.as_deref(),
        Some("alice")
    );
    assert_eq!(backend.calls(), vec!["assign_item 2 alice"]);
}
