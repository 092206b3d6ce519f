//! Queue repository tests against an embedded database
//!
//! Run: cargo test -p waitlist-server --test queue_repository

use shared::models::QueueStatus;
use tempfile::TempDir;
use waitlist_server::db::DbService;
use waitlist_server::db::models::QueueEntryCreate;
use waitlist_server::db::repository::{QueueEntryRepository, RepoError};

async fn test_repo() -> (TempDir, QueueEntryRepository) {
    let tmp = tempfile::tempdir().unwrap();
    let db = DbService::new(tmp.path()).await.unwrap();
    let repo = QueueEntryRepository::new(db.db.clone());
    (tmp, repo)
}

fn join(name: &str, phone: &str, party_size: i32) -> QueueEntryCreate {
    QueueEntryCreate {
        customer_name: name.to_string(),
        phone_number: phone.to_string(),
        party_size,
    }
}

#[tokio::test]
async fn sequential_joins_get_increasing_positions() {
    let (_tmp, repo) = test_repo().await;

    for i in 1..=5 {
        let entry = repo
            .create(join(&format!("Guest {}", i), &format!("555-000{}", i), 2))
            .await
            .unwrap();
        assert_eq!(entry.position, i, "join #{} should get position {}", i, i);
        assert_eq!(entry.estimated_wait_time, 15 * i);
        assert_eq!(entry.status, QueueStatus::Waiting);
        assert!(entry.id.is_some());
        assert!(entry.created_at > 0);
    }

    let all = repo.find_all().await.unwrap();
    assert_eq!(all.len(), 5);
    // ordered by position ascending
    let positions: Vec<i32> = all.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn wait_time_tracks_waiting_count() {
    let (_tmp, repo) = test_repo().await;

    assert_eq!(repo.count_waiting().await.unwrap(), 0);

    let alice = repo.create(join("Alice", "555-1", 2)).await.unwrap();
    let _bob = repo.create(join("Bob", "555-2", 4)).await.unwrap();
    assert_eq!(repo.count_waiting().await.unwrap(), 2);

    // seated entries no longer count as waiting
    let alice_id = alice.id.unwrap().to_string();
    repo.update_status(&alice_id, QueueStatus::Seated)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repo.count_waiting().await.unwrap(), 1);
}

#[tokio::test]
async fn position_is_never_renumbered() {
    let (_tmp, repo) = test_repo().await;

    let alice = repo.create(join("Alice", "555-1", 2)).await.unwrap();
    let bob = repo.create(join("Bob", "555-2", 4)).await.unwrap();
    let carol = repo.create(join("Carol", "555-3", 3)).await.unwrap();
    let alice_id = alice.id.unwrap().to_string();
    let bob_id = bob.id.unwrap().to_string();
    let carol_id = carol.id.unwrap().to_string();

    // removing the head of the queue must not shift later positions
    repo.delete(&alice_id).await.unwrap().unwrap();
    let bob_after = repo.find_by_id(&bob_id).await.unwrap().unwrap();
    let carol_after = repo.find_by_id(&carol_id).await.unwrap().unwrap();
    assert_eq!(bob_after.position, 2);
    assert_eq!(bob_after.estimated_wait_time, 30);
    assert_eq!(carol_after.position, 3);
    assert_eq!(carol_after.estimated_wait_time, 45);

    // status changes must not touch positions either
    repo.update_status(&bob_id, QueueStatus::Notified)
        .await
        .unwrap()
        .unwrap();
    let carol_after = repo.find_by_id(&carol_id).await.unwrap().unwrap();
    assert_eq!(carol_after.position, 3);
    assert_eq!(carol_after.estimated_wait_time, 45);

    // the next join counts current waiting entries (Bob notified, Carol waiting)
    // => 1 waiting + 1 = position 2, colliding with Bob's stale position.
    // That is the specified (stale/non-contiguous) behavior.
    let dave = repo.create(join("Dave", "555-4", 2)).await.unwrap();
    assert_eq!(dave.position, 2);
}

#[tokio::test]
async fn update_status_only_touches_status() {
    let (_tmp, repo) = test_repo().await;

    let alice = repo.create(join("Alice", "555-1", 2)).await.unwrap();
    let alice_id = alice.id.unwrap().to_string();

    let updated = repo
        .update_status(&alice_id, QueueStatus::Notified)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, QueueStatus::Notified);
    assert_eq!(updated.customer_name, "Alice");
    assert_eq!(updated.phone_number, "555-1");
    assert_eq!(updated.party_size, 2);
    assert_eq!(updated.position, alice.position);
    assert_eq!(updated.estimated_wait_time, alice.estimated_wait_time);
    assert_eq!(updated.created_at, alice.created_at);
}

#[tokio::test]
async fn unknown_ids_are_not_found_without_mutation() {
    let (_tmp, repo) = test_repo().await;

    let alice = repo.create(join("Alice", "555-1", 2)).await.unwrap();
    let alice_id = alice.id.unwrap().to_string();

    // update on a non-existent id: Ok(None), no store mutation
    let missing = repo
        .update_status("queue_entry:doesnotexist", QueueStatus::Seated)
        .await
        .unwrap();
    assert!(missing.is_none());

    // delete on a non-existent id: Ok(None), no store mutation
    let missing = repo.delete("queue_entry:doesnotexist").await.unwrap();
    assert!(missing.is_none());

    let all = repo.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    let alice_after = repo.find_by_id(&alice_id).await.unwrap().unwrap();
    assert_eq!(alice_after.status, QueueStatus::Waiting);
}

#[tokio::test]
async fn malformed_ids_are_validation_errors() {
    let (_tmp, repo) = test_repo().await;

    let err = repo.find_by_id("not a record id").await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo
        .update_status("///", QueueStatus::Seated)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn alice_bob_scenario() {
    let (_tmp, repo) = test_repo().await;

    // join("Alice","555-1",2) → position=1, wait=15
    let alice = repo.create(join("Alice", "555-1", 2)).await.unwrap();
    assert_eq!(alice.position, 1);
    assert_eq!(alice.estimated_wait_time, 15);

    // join("Bob","555-2",4) → position=2, wait=30
    let bob = repo.create(join("Bob", "555-2", 4)).await.unwrap();
    assert_eq!(bob.position, 2);
    assert_eq!(bob.estimated_wait_time, 30);

    // both waiting → current wait = 30
    assert_eq!(repo.count_waiting().await.unwrap() * 15, 30);

    // Alice seated → only Bob waiting → 15
    let alice_id = alice.id.unwrap().to_string();
    repo.update_status(&alice_id, QueueStatus::Seated)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repo.count_waiting().await.unwrap() * 15, 15);

    // remove both → queue is empty
    let bob_id = bob.id.unwrap().to_string();
    repo.delete(&bob_id).await.unwrap().unwrap();
    repo.delete(&alice_id).await.unwrap().unwrap();
    assert!(repo.find_all().await.unwrap().is_empty());
}
