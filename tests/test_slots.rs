use std::net::SocketAddr;

use relic::server::{SlotStatus, SlotTable};

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

#[test]
fn test_slot_lifecycle_transitions() {
    use SlotStatus::*;

    assert!(Empty.can_become(New));
    assert!(New.can_become(Working));
    assert!(Working.can_become(Stopped));
    assert!(Stopped.can_become(Empty));

    assert!(!Empty.can_become(Working));
    assert!(!New.can_become(Stopped));
    assert!(!Working.can_become(Empty));
    assert!(!Stopped.can_become(Working));
}

#[test]
fn test_finished_is_terminal() {
    use SlotStatus::*;

    for status in [Empty, New, Working, Stopped] {
        assert!(status.can_become(Finished));
        assert!(!Finished.can_become(status));
    }
}

#[tokio::test]
async fn test_claim_until_full() {
    let table = SlotTable::new(2);

    assert_eq!(table.claim(peer(), 1).await, Some(0));
    assert_eq!(table.claim(peer(), 2).await, Some(1));
    assert_eq!(table.claim(peer(), 3).await, None);
    assert_eq!(table.count(SlotStatus::New).await, 2);
}

#[tokio::test]
async fn test_claim_records_peer_and_worker() {
    let table = SlotTable::new(1);
    let index = table.claim(peer(), 7).await.unwrap();

    let slot = &table.snapshot().await[index];
    assert_eq!(slot.status, SlotStatus::New);
    assert_eq!(slot.worker_id, Some(7));
    assert_eq!(slot.peer, Some(peer()));
}

#[tokio::test]
async fn test_full_cycle_frees_slot() {
    let table = SlotTable::new(1);
    let index = table.claim(peer(), 1).await.unwrap();

    assert!(table.transition(index, SlotStatus::Working).await);
    assert!(!table.release(index).await);
    assert!(table.transition(index, SlotStatus::Stopped).await);
    assert!(table.release(index).await);

    let slot = &table.snapshot().await[index];
    assert_eq!(slot.status, SlotStatus::Empty);
    assert!(slot.worker_id.is_none());
    assert!(slot.peer.is_none());
    assert_eq!(table.claim(peer(), 2).await, Some(index));
}

#[tokio::test]
async fn test_recover_frees_abandoned_slot() {
    let table = SlotTable::new(1);
    let index = table.claim(peer(), 1).await.unwrap();
    table.transition(index, SlotStatus::Working).await;

    table.recover(index).await;

    assert_eq!(table.status(index).await, Some(SlotStatus::Empty));
}

#[tokio::test]
async fn test_finish_all_blocks_pending_workers() {
    let table = SlotTable::new(3);
    let pending = table.claim(peer(), 1).await.unwrap();

    table.finish_all().await;

    assert_eq!(table.count(SlotStatus::Finished).await, 3);
    assert!(!table.transition(pending, SlotStatus::Working).await);
    assert!(table.claim(peer(), 2).await.is_none());

    table.recover(pending).await;
    assert_eq!(table.status(pending).await, Some(SlotStatus::Finished));
}

#[tokio::test]
async fn test_out_of_range_index() {
    let table = SlotTable::new(1);

    assert!(!table.transition(5, SlotStatus::New).await);
    assert_eq!(table.status(5).await, None);
}
