//! Chaos scenarios for the assignment store.
//!
//! Each test reproduces a failure mode the swipe UI has hit in the field
//! (doppelganger applications, full-slate bypass, zombie drafts, stale
//! flushes) and pins down the behaviour that rules it out.

use std::sync::Arc;
use std::time::Duration;

use slate_engine::selectors::{placement, select_manifest_items, select_slate, Placement};
use slate_engine::{
    invariants, AssignmentStore, InMemoryStorage, SlateConfig, SlateStorage, SwipeOutcome,
};
use slate_types::{
    ApplicationId, Billet, BilletId, BilletStatus, Decision, ManifestCategory, Mode, SlateError,
    SwipeDirection, UserId,
};

fn user() -> UserId {
    UserId::new("sailor-1")
}

fn bid(id: &str) -> BilletId {
    BilletId::new(id)
}

fn billets(count: usize) -> Vec<Billet> {
    (0..count)
        .map(|i| {
            Billet::new(
                BilletId::new(format!("B{}", i)),
                format!("Billet {}", i),
                "USS Example",
                "Norfolk, VA",
            )
        })
        .collect()
}

fn store(count: usize) -> AssignmentStore {
    let mut store = AssignmentStore::new(SlateConfig::default());
    store.load_billets(billets(count));
    store
}

fn assert_consistent(store: &AssignmentStore) {
    let violations = invariants::check(store.state());
    assert!(violations.is_empty(), "violations: {:?}", violations);
}

fn live_ranks(store: &AssignmentStore) -> Vec<(BilletId, u32)> {
    select_slate(store.state(), &user())
        .into_iter()
        .map(|e| (e.application.billet_id.clone(), e.application.preference_rank))
        .collect()
}

fn live_for(store: &AssignmentStore, billet: &BilletId) -> usize {
    store
        .state()
        .application_ledger()
        .live()
        .filter(|a| &a.billet_id == billet)
        .count()
}

#[test]
fn test_undo_loop_leaves_no_orphans() {
    for n in 0..12 {
        let mut store = store(3);
        for _ in 0..n {
            let outcome = store.swipe(&bid("B0"), SwipeDirection::Up, &user());
            assert!(matches!(outcome, SwipeOutcome::Promoted(_)));
            assert!(store.undo(&user()).is_some());
            assert_consistent(&store);
        }

        let referencing = store
            .state()
            .applications()
            .values()
            .filter(|a| a.billet_id == bid("B0"))
            .count();
        assert_eq!(referencing, 0, "n = {}", n);
        assert!(store.state().real_decisions().get(&bid("B0")).is_none());
    }
}

#[test]
fn test_full_slate_bypass_blocked() {
    let mut store = store(8);
    for i in 0..7 {
        store.swipe(&bid(&format!("B{}", i)), SwipeDirection::Up, &user());
    }
    assert_eq!(store.user_application_ids(&user()).len(), 7);

    let overflow = bid("B7");
    let outcome = store.swipe(&overflow, SwipeDirection::Up, &user());
    assert!(outcome.slate_full());
    assert_eq!(store.state().real_decisions().get(&overflow), Some(&Decision::Super));
    assert_eq!(live_for(&store, &overflow), 0);
    assert_eq!(
        placement(store.state(), &overflow),
        Some(Placement::Manifest(ManifestCategory::Favorites))
    );

    let victim = store.user_application_ids(&user())[3].clone();
    store.withdraw_application(&victim, &user()).unwrap();

    assert!(store.promote_to_slate(&overflow, &user()));
    assert_eq!(live_for(&store, &overflow), 1);
    assert!(!store.promote_to_slate(&overflow, &user()));
    assert_eq!(live_for(&store, &overflow), 1);
    assert_consistent(&store);
}

#[test]
fn test_withdraw_leaves_no_zombie_decision() {
    for prior in [SwipeDirection::Left, SwipeDirection::Right, SwipeDirection::Up] {
        let mut store = store(2);
        store.swipe(&bid("B0"), prior, &user());
        if !store.state().application_ledger().has_live(&bid("B0")) {
            assert!(store.promote_to_slate(&bid("B0"), &user()));
        }

        let app = store.user_application_ids(&user())[0].clone();
        store.withdraw_application(&app, &user()).unwrap();

        assert!(store.state().real_decisions().get(&bid("B0")).is_none());
        assert_eq!(placement(store.state(), &bid("B0")), Some(Placement::Manifest(ManifestCategory::Remaining)));
        assert_consistent(&store);
    }
}

#[test]
fn test_withdraw_leaves_other_billets_untouched() {
    let mut store = store(4);
    store.swipe(&bid("B0"), SwipeDirection::Up, &user());
    store.swipe(&bid("B1"), SwipeDirection::Right, &user());
    store.swipe(&bid("B2"), SwipeDirection::Up, &user());
    store.swipe(&bid("B3"), SwipeDirection::Left, &user());

    let kept = store.state().live_application_for(&bid("B2")).cloned().unwrap();
    let withdrawn = store.state().live_application_for(&bid("B0")).unwrap().id.clone();
    store.withdraw_application(&withdrawn, &user()).unwrap();

    let decisions = store.state().real_decisions();
    assert_eq!(decisions.get(&bid("B1")), Some(&Decision::Like));
    assert_eq!(decisions.get(&bid("B2")), Some(&Decision::Super));
    assert_eq!(decisions.get(&bid("B3")), Some(&Decision::Nope));

    let after = store.state().live_application_for(&bid("B2")).unwrap();
    assert_eq!(after.id, kept.id);
    assert_eq!(after.status, kept.status);
    assert_eq!(after.preference_rank, 1);
}

#[test]
fn test_ranks_stay_dense_after_any_withdrawal() {
    for n in 1..=7 {
        for victim in 0..n {
            let mut store = store(n);
            for i in 0..n {
                store.swipe(&bid(&format!("B{}", i)), SwipeDirection::Up, &user());
            }
            let ids: Vec<ApplicationId> = store.user_application_ids(&user());
            store.withdraw_application(&ids[victim], &user()).unwrap();

            let ranks = live_ranks(&store);
            let expected: Vec<(BilletId, u32)> = (0..n)
                .filter(|i| *i != victim)
                .enumerate()
                .map(|(rank, i)| (bid(&format!("B{}", i)), rank as u32 + 1))
                .collect();
            assert_eq!(ranks, expected, "n = {}, victim = {}", n, victim);
        }
    }
}

#[test]
fn test_sandbox_swipes_never_reach_real_ledgers() {
    let mut store = store(3);
    store.swipe(&bid("B2"), SwipeDirection::Right, &user());
    let real_before = store.state().real_decisions().clone();

    for toggles in 0..4 {
        for _ in 0..toggles {
            store.set_mode(Mode::Real);
            store.set_mode(Mode::Sandbox);
        }
        store.set_mode(Mode::Sandbox);
        store.swipe(&bid("B0"), SwipeDirection::Up, &user());
        assert!(!store.promote_to_slate(&bid("B1"), &user()));
        store.set_mode(Mode::Real);
        store.set_mode(Mode::Sandbox);
    }

    assert!(store.state().applications().is_empty());
    assert_eq!(store.state().real_decisions(), &real_before);
    assert_eq!(store.state().sandbox_decisions().get(&bid("B0")), Some(&Decision::Super));
}

#[test]
fn test_projected_billet_never_promoted() {
    let mut store = AssignmentStore::new(SlateConfig::default());
    let mut feed = billets(2);
    feed.push(
        Billet::new(bid("P0"), "Projected", "USS Future", "Mayport, FL")
            .with_status(BilletStatus::Projected),
    );
    store.load_billets(feed);

    assert!(!store.promote_to_slate(&bid("P0"), &user()));
    let outcome = store.swipe(&bid("P0"), SwipeDirection::Up, &user());
    assert!(matches!(outcome, SwipeOutcome::PromotionDenied(_)));
    assert!(store.state().applications().is_empty());
    assert_eq!(store.user_application_ids(&user()).len(), 0);
}

#[test]
fn test_manifest_and_slate_partition() {
    let mut store = store(5);
    let script = [
        ("B0", SwipeDirection::Up),
        ("B1", SwipeDirection::Right),
        ("B2", SwipeDirection::Up),
        ("B3", SwipeDirection::Left),
        ("B1", SwipeDirection::Up),
        ("B4", SwipeDirection::Down),
    ];
    for (billet, direction) in script {
        store.swipe(&bid(billet), direction, &user());
        assert_partitioned(&store);
    }

    let first = store.user_application_ids(&user())[0].clone();
    store.withdraw_application(&first, &user()).unwrap();
    assert_partitioned(&store);

    while store.undo(&user()).is_some() {
        assert_partitioned(&store);
    }
    assert_consistent(&store);
}

fn assert_partitioned(store: &AssignmentStore) {
    for id in store.state().billets().keys() {
        let on_slate = select_slate(store.state(), &user())
            .iter()
            .filter(|e| &e.application.billet_id == id)
            .count();
        let in_manifest = ManifestCategory::ALL
            .into_iter()
            .map(|c| {
                select_manifest_items(store.state(), c)
                    .iter()
                    .filter(|item| &item.billet.id == id)
                    .count()
            })
            .sum::<usize>();
        assert_eq!(on_slate + in_manifest, 1, "billet {} appears {} times", id, on_slate + in_manifest);
    }
}

#[tokio::test(start_paused = true)]
async fn test_debounced_write_after_withdrawal() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut store = AssignmentStore::with_storage(SlateConfig::default(), storage.clone());
    store.load_billets(billets(2));
    let (a, b) = (bid("B0"), bid("B1"));

    store.swipe(&a, SwipeDirection::Up, &user());
    store.swipe(&b, SwipeDirection::Right, &user());
    let app = store.state().live_application_for(&a).unwrap().id.clone();
    store.withdraw_application(&app, &user()).unwrap();

    tokio::time::sleep(Duration::from_millis(2200)).await;
    tokio::task::yield_now().await;

    let stored = storage.load_decisions(&user()).await.unwrap();
    assert!(stored.get(&a).is_none());
    assert_eq!(stored.get(&b), Some(&Decision::Like));
    let stored_apps = storage.load_applications(&user()).await.unwrap();
    assert!(stored_apps.iter().all(|x| x.billet_id != a));
    assert_eq!(store.pending_writes(), 0);

    let candidates = select_manifest_items(store.state(), ManifestCategory::Candidates);
    let favorites = select_manifest_items(store.state(), ManifestCategory::Favorites);
    assert!(candidates.iter().any(|i| i.billet.id == b));
    assert!(candidates.iter().chain(favorites.iter()).all(|i| i.billet.id != a));
}

#[tokio::test(start_paused = true)]
async fn test_hydrate_restores_real_ledgers() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut first = AssignmentStore::with_storage(SlateConfig::default(), storage.clone());
    first.load_billets(billets(3));
    first.swipe(&bid("B0"), SwipeDirection::Up, &user());
    first.swipe(&bid("B1"), SwipeDirection::Left, &user());
    first.set_mode(Mode::Sandbox);
    first.swipe(&bid("B2"), SwipeDirection::Right, &user());
    first.flush().await.unwrap();

    let mut second = AssignmentStore::with_storage(SlateConfig::default(), storage);
    second.load_billets(billets(3));
    second.hydrate(&user()).await.unwrap();

    assert_eq!(second.state().real_decisions().len(), 2);
    assert!(second.state().sandbox_decisions().is_empty());
    assert_eq!(live_ranks(&second), vec![(bid("B0"), 1)]);
    assert!(!second.state().can_undo());
    assert_consistent(&second);
}

#[tokio::test(start_paused = true)]
async fn test_hydrate_drops_flushes_for_replaced_state() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut store = AssignmentStore::with_storage(SlateConfig::default(), storage.clone());
    store.load_billets(billets(2));

    store.swipe(&bid("B0"), SwipeDirection::Right, &user());
    store.hydrate(&user()).await.unwrap();
    assert_eq!(store.pending_writes(), 0);

    tokio::time::sleep(Duration::from_millis(2200)).await;
    tokio::task::yield_now().await;

    let stored = storage.load_decisions(&user()).await.unwrap();
    assert_eq!(&stored, store.state().real_decisions());
    assert!(stored.is_empty());
    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn test_hydrate_refused_while_another_user_holds_slate() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut store = AssignmentStore::with_storage(SlateConfig::default(), storage);
    store.load_billets(billets(2));
    let other = UserId::new("sailor-2");

    store.swipe(&bid("B0"), SwipeDirection::Up, &user());
    let err = store.hydrate(&other).await.unwrap_err();

    match err {
        SlateError::SessionConflict { user_id, owner } => {
            assert_eq!(user_id, other);
            assert_eq!(owner, user());
        }
        e => panic!("unexpected error {:?}", e),
    }
    assert_eq!(store.state().real_decisions().get(&bid("B0")), Some(&Decision::Super));
    assert_eq!(store.user_application_ids(&user()).len(), 1);
    assert_consistent(&store);
}

#[tokio::test(start_paused = true)]
async fn test_shared_decisions_not_written_under_second_user() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut store = AssignmentStore::with_storage(SlateConfig::default(), storage.clone());
    store.load_billets(billets(2));
    let other = UserId::new("sailor-2");

    store.swipe(&bid("B0"), SwipeDirection::Up, &user());
    store.swipe(&bid("B1"), SwipeDirection::Right, &other);

    tokio::time::sleep(Duration::from_millis(2200)).await;
    tokio::task::yield_now().await;

    assert!(storage.load_decisions(&other).await.unwrap().is_empty());
    let mine = storage.load_decisions(&user()).await.unwrap();
    assert_eq!(mine.get(&bid("B0")), Some(&Decision::Super));
    assert!(mine.get(&bid("B1")).is_none());
}
