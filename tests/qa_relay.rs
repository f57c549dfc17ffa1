//! QA tests for relay forwarding and coordinator election.
//!
//! These tests simulate multiple client processes sharing one table:
//! - Unprivileged writes forwarded to a coordinator and applied there
//! - Exactly-one-writer behavior with several active coordinators
//! - Duplicate delivery tolerance (idempotent final-state writes)
//! - Failover when the primary coordinator goes inactive

use influence_core::testing::TestHarness;
use influence_core::{Directive, InfluenceEntry, RelayRequest, SideOutcome, UserId};

#[tokio::test]
async fn test_unprivileged_write_is_forwarded_and_applied() {
    let harness = TestHarness::new();
    let coordinator = harness.coordinator();
    let player = harness.player();

    let kate = harness.add_participant("Kate", Some(player)).await;
    let bison = harness.add_participant("Bison", None).await;

    // The coordinator's client is listening; the player's is acting.
    let coordinator_session = harness.session(coordinator);
    let worker = coordinator_session.spawn_relay_worker();

    let player_session = harness.session(player);
    let report = player_session
        .sync_pair(kate, bison, Directive::SetForward)
        .await
        .unwrap();

    // The player's own side committed directly; Bison's was forwarded.
    assert!(report.partial);
    assert!(matches!(report.a.outcome, SideOutcome::Applied { .. }));
    assert!(matches!(report.b.outcome, SideOutcome::Forwarded { .. }));

    harness.settle().await;

    let bison_entries = harness.store.read_entries(bison).await.unwrap();
    assert_eq!(bison_entries.len(), 1);
    assert!(bison_entries[0].has_influence_over);

    worker.abort();
}

#[tokio::test]
async fn test_exactly_one_coordinator_services_a_request() {
    let harness = TestHarness::new();
    let kate = harness.add_participant("Kate", None).await;

    // Three active coordinators, all listening.
    let workers: Vec<_> = (0..3)
        .map(|_| harness.coordinator())
        .map(|id| harness.session(id).spawn_relay_worker())
        .collect();

    harness
        .relay
        .publish(RelayRequest::InfluenceWrite {
            character: kate,
            entries: vec![InfluenceEntry::new("Bison").with_have(true)],
            origin: UserId::new(),
        })
        .unwrap();

    harness.settle().await;

    // All three received the payload; exactly one performed the write.
    assert_eq!(harness.store.commit_count(), 1);
    assert!(harness.store.read_entries(kate).await.unwrap()[0].have_influence_over);

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_duplicate_delivery_is_idempotent() {
    let harness = TestHarness::new();
    let coordinator = harness.coordinator();
    let kate = harness.add_participant("Kate", None).await;

    let worker = harness.session(coordinator).spawn_relay_worker();

    let request = RelayRequest::InfluenceWrite {
        character: kate,
        entries: vec![InfluenceEntry::new("Bison").with_have(true)],
        origin: UserId::new(),
    };

    // At-least-once transport: the same request arrives twice.
    harness.relay.publish(request.clone()).unwrap();
    harness.relay.publish(request).unwrap();
    harness.settle().await;

    let entries = harness.store.read_entries(kate).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].have_influence_over);

    worker.abort();
}

#[tokio::test]
async fn test_failover_when_primary_goes_inactive() {
    let harness = TestHarness::new();
    let first = harness.coordinator();
    let second = harness.coordinator();
    let kate = harness.add_participant("Kate", None).await;

    let workers = [
        harness.session(first).spawn_relay_worker(),
        harness.session(second).spawn_relay_worker(),
    ];

    // Whoever currently wins the election drops off before the request.
    let primary = if first < second { first } else { second };
    harness.directory.set_active(primary, false);

    harness
        .relay
        .publish(RelayRequest::InfluenceWrite {
            character: kate,
            entries: vec![InfluenceEntry::new("Bison").with_have(true)],
            origin: UserId::new(),
        })
        .unwrap();
    harness.settle().await;

    // The surviving coordinator picked it up.
    assert_eq!(harness.store.commit_count(), 1);
    assert!(harness.store.read_entries(kate).await.unwrap()[0].have_influence_over);

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_transport_failure_still_commits_local_side() {
    let harness = TestHarness::new();
    let player = harness.player();

    // A coordinator is listed as present, but no worker is subscribed, so
    // the publish itself fails.
    let _ghost = harness.coordinator();

    let kate = harness.add_participant("Kate", Some(player)).await;
    let bison = harness.add_participant("Bison", None).await;

    let session = harness.session(player);
    let report = session
        .sync_pair(kate, bison, Directive::SetForward)
        .await
        .unwrap();

    assert!(report.partial);
    assert!(matches!(report.a.outcome, SideOutcome::Applied { .. }));
    assert!(matches!(report.b.outcome, SideOutcome::Failed { .. }));

    assert!(harness.store.read_entries(kate).await.unwrap()[0].have_influence_over);
    assert!(harness.store.read_entries(bison).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_relayed_round_write_lands() {
    let harness = TestHarness::new();
    let coordinator = harness.coordinator();
    let player = harness.player();
    let kate = harness.add_participant("Kate", None).await;

    let worker = harness.session(coordinator).spawn_relay_worker();

    // The player owns nothing; the toggle must travel via the relay.
    let session = harness.session(player);
    let report = session.toggle_participation(kate).await.unwrap();
    assert!(report.now_inactive);
    assert!(report.outcome.is_partial());

    harness.settle().await;

    let rounds = harness.store.read_rounds().await;
    assert!(rounds.is_inactive(kate));

    worker.abort();
}
