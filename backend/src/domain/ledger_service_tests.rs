//! Behaviour tests for the transfer engine over the in-memory ledger.

use std::sync::Arc;

use rstest::rstest;

use crate::domain::ErrorCode;
use crate::domain::account::{PointsAmount, SYSTEM_SEED_BALANCE};
use crate::domain::ledger_service::PointsService;
use crate::domain::ports::{
    Cache, CacheError, EarnPointsRequest, InMemoryCache, InMemoryLedger, LedgerRepositoryError,
    MockCache, MockLedgerRepository, NoOpCache, PointsCommand, PointsQuery,
    RedeemPointsRequest, TransactionHistoryRequest, TransferPointsRequest,
};
use crate::domain::user::UserId;

fn points(amount: i64) -> PointsAmount {
    PointsAmount::new(amount).expect("positive test amount")
}

fn earn(recipient: UserId, amount: i64) -> EarnPointsRequest {
    EarnPointsRequest {
        recipient,
        amount: points(amount),
        reason: "recognition".into(),
        description: None,
        granted_by: None,
    }
}

fn redeem(user: UserId, amount: i64) -> RedeemPointsRequest {
    RedeemPointsRequest {
        user,
        amount: points(amount),
        reason: "reward_redemption".into(),
        description: None,
    }
}

fn transfer(from: UserId, to: UserId, amount: i64) -> TransferPointsRequest {
    TransferPointsRequest {
        from,
        to,
        amount: points(amount),
        reason: "peer_recognition".into(),
        description: None,
    }
}

struct Harness {
    ledger: Arc<InMemoryLedger>,
    service: PointsService<InMemoryLedger>,
    u1: UserId,
    u2: UserId,
}

fn harness() -> Harness {
    let u1 = UserId::random();
    let u2 = UserId::random();
    let ledger = Arc::new(
        InMemoryLedger::new()
            .with_user_account(u1, 0)
            .with_user_account(u2, 0),
    );
    let service = PointsService::new(Arc::clone(&ledger), Arc::new(NoOpCache));
    Harness {
        ledger,
        service,
        u1,
        u2,
    }
}

#[rstest]
#[tokio::test]
async fn earn_transfer_redeem_scenario() {
    let h = harness();

    h.service.earn(earn(h.u1, 500)).await.expect("earn");
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 500);

    h.service
        .transfer(transfer(h.u1, h.u2, 500))
        .await
        .expect("transfer");
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 0);
    assert_eq!(h.service.balance(&h.u2).await.expect("balance"), 500);

    h.service.redeem(redeem(h.u2, 500)).await.expect("redeem");
    assert_eq!(h.service.balance(&h.u2).await.expect("balance"), 0);

    let error = h
        .service
        .redeem(redeem(h.u2, 1))
        .await
        .expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(h.service.balance(&h.u2).await.expect("balance"), 0);
}

#[rstest]
#[tokio::test]
async fn points_are_conserved_across_operations() {
    let h = harness();

    h.service.earn(earn(h.u1, 700)).await.expect("earn");
    h.service.earn(earn(h.u2, 300)).await.expect("earn");
    h.service
        .transfer(transfer(h.u1, h.u2, 250))
        .await
        .expect("transfer");
    h.service.redeem(redeem(h.u2, 100)).await.expect("redeem");
    // A rejected operation must not move anything either.
    let _ = h.service.redeem(redeem(h.u1, 10_000)).await;

    assert_eq!(h.ledger.total_points(), SYSTEM_SEED_BALANCE);
}

#[rstest]
#[tokio::test]
async fn exact_balance_redemption_succeeds_and_one_more_fails() {
    let h = harness();
    h.service.earn(earn(h.u1, 500)).await.expect("earn");

    let error = h
        .service
        .redeem(redeem(h.u1, 501))
        .await
        .expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details.get("requested"), Some(&serde_json::json!(501)));
    assert_eq!(details.get("available"), Some(&serde_json::json!(500)));
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 500);

    h.service.redeem(redeem(h.u1, 500)).await.expect("redeem");
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 0);
}

#[rstest]
#[tokio::test]
async fn rejected_transfer_leaves_both_balances_untouched() {
    let h = harness();
    h.service.earn(earn(h.u1, 100)).await.expect("earn");

    let error = h
        .service
        .transfer(transfer(h.u1, h.u2, 101))
        .await
        .expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 100);
    assert_eq!(h.service.balance(&h.u2).await.expect("balance"), 0);
}

#[rstest]
#[tokio::test]
async fn missing_recipient_account_aborts_the_whole_operation() {
    let h = harness();
    let stranger = UserId::random();

    let error = h
        .service
        .transfer(transfer(h.u1, stranger, 10))
        .await
        .expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(h.ledger.total_points(), 0);

    let error = h.service.earn(earn(stranger, 10)).await.expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::NotFound);
    // The lazily created system account still holds its full seed.
    assert_eq!(h.ledger.total_points(), SYSTEM_SEED_BALANCE);
}

#[rstest]
#[tokio::test]
async fn self_transfer_is_rejected() {
    let h = harness();
    h.service.earn(earn(h.u1, 50)).await.expect("earn");

    let error = h
        .service
        .transfer(transfer(h.u1, h.u1, 10))
        .await
        .expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(h.service.balance(&h.u1).await.expect("balance"), 50);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_reason_is_rejected(#[case] reason: &str) {
    let h = harness();
    let mut request = earn(h.u1, 10);
    request.reason = reason.into();

    let error = h.service.earn(request).await.expect_err("must reject");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn balance_of_unknown_user_is_zero() {
    let h = harness();
    let stranger = UserId::random();
    assert_eq!(h.service.balance(&stranger).await.expect("balance"), 0);
}

#[rstest]
#[tokio::test]
async fn balances_are_cached_and_invalidated_on_movement() {
    let u1 = UserId::random();
    let u2 = UserId::random();
    let ledger = Arc::new(
        InMemoryLedger::new()
            .with_user_account(u1, 0)
            .with_user_account(u2, 0),
    );
    let cache = Arc::new(InMemoryCache::new());
    let service = PointsService::new(Arc::clone(&ledger), Arc::clone(&cache) as Arc<dyn Cache>);

    service.earn(earn(u1, 80)).await.expect("earn");
    assert_eq!(service.balance(&u1).await.expect("balance"), 80);
    let key = format!("points:balance:user:{u1}");
    assert!(cache.contains(&key));

    service
        .transfer(transfer(u1, u2, 30))
        .await
        .expect("transfer");
    assert!(!cache.contains(&key));
    assert_eq!(service.balance(&u1).await.expect("balance"), 50);
}

#[rstest]
#[tokio::test]
async fn cache_failures_degrade_to_the_ledger() {
    let u1 = UserId::random();
    let ledger = Arc::new(InMemoryLedger::new().with_user_account(u1, 0));
    let mut cache = MockCache::new();
    cache
        .expect_get()
        .returning(|_| Err(CacheError::backend("redis unreachable")));
    cache
        .expect_set()
        .returning(|_, _, _| Err(CacheError::backend("redis unreachable")));
    cache
        .expect_invalidate()
        .returning(|_| Err(CacheError::backend("redis unreachable")));
    let service = PointsService::new(Arc::clone(&ledger), Arc::new(cache));

    // Postings and reads both keep working when every cache call errors.
    service.earn(earn(u1, 120)).await.expect("earn");
    assert_eq!(service.balance(&u1).await.expect("balance"), 120);

    service.redeem(redeem(u1, 20)).await.expect("redeem");
    assert_eq!(service.balance(&u1).await.expect("balance"), 100);
}

#[rstest]
#[tokio::test]
async fn unreachable_ledger_reads_report_service_unavailable() {
    let mut ledger = MockLedgerRepository::new();
    ledger
        .expect_account_for_user()
        .returning(|_| Err(LedgerRepositoryError::connection("connection refused")));
    let service = PointsService::new(Arc::new(ledger), Arc::new(NoOpCache));

    let error = service
        .balance(&UserId::random())
        .await
        .expect_err("must fail");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn history_pages_are_newest_first_and_disjoint() {
    let h = harness();
    for amount in 1..=5 {
        h.service.earn(earn(h.u1, amount)).await.expect("earn");
        // Keep creation timestamps strictly increasing so the newest-first
        // ordering assertion below is deterministic.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let first = h
        .service
        .history(TransactionHistoryRequest {
            user: h.u1,
            before: None,
            limit: 2,
        })
        .await
        .expect("first page");
    assert_eq!(first.transactions.len(), 2);
    let next = first.next.expect("more pages");
    assert_eq!(first.transactions[0].amount().as_i64(), 5);
    assert_eq!(first.transactions[1].amount().as_i64(), 4);

    let second = h
        .service
        .history(TransactionHistoryRequest {
            user: h.u1,
            before: Some(next),
            limit: 2,
        })
        .await
        .expect("second page");
    assert_eq!(second.transactions.len(), 2);
    assert_eq!(second.transactions[0].amount().as_i64(), 3);
    assert_eq!(second.transactions[1].amount().as_i64(), 2);

    let third = h
        .service
        .history(TransactionHistoryRequest {
            user: h.u1,
            before: second.next,
            limit: 2,
        })
        .await
        .expect("third page");
    assert_eq!(third.transactions.len(), 1);
    assert_eq!(third.transactions[0].amount().as_i64(), 1);
    assert!(third.next.is_none());
}

#[rstest]
#[tokio::test]
async fn history_of_unknown_user_is_empty() {
    let h = harness();
    let page = h
        .service
        .history(TransactionHistoryRequest {
            user: UserId::random(),
            before: None,
            limit: 10,
        })
        .await
        .expect("history");
    assert!(page.transactions.is_empty());
    assert!(page.next.is_none());
}
