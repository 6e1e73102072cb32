mod common;

use attendance_ledger::utils::time::jakarta_offset;
use attendance_ledger::{
    AttendanceAction, AttendanceError, AttendanceStatus, LedgerPolicy, Role, TodayStatus,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use common::{TestContext, jakarta};

#[tokio::test]
async fn test_late_check_in_then_check_out_scenario() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let check_in = jakarta(2024, 3, 4, 9, 15);
    let record = ctx.ledger.check_in("alice", check_in).await.unwrap();
    assert_eq!(record.status, AttendanceStatus::Late);
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    assert_eq!(
        ctx.ledger.today_status_for("alice", check_in).await.unwrap(),
        TodayStatus::CheckedIn
    );

    let check_out = jakarta(2024, 3, 4, 17, 0);
    let completed = ctx.ledger.check_out("alice", check_out).await.unwrap();
    assert_eq!(completed.check_out_time, Some(check_out));
    assert_eq!(
        ctx.ledger.today_status_for("alice", check_out).await.unwrap(),
        TodayStatus::CheckedOut
    );

    let again = ctx
        .ledger
        .check_out("alice", jakarta(2024, 3, 4, 17, 5))
        .await;
    assert!(matches!(again, Err(AttendanceError::AlreadyCheckedOut { .. })));
}

#[tokio::test]
async fn test_round_trip_through_history() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let check_in = jakarta(2024, 3, 4, 8, 45);
    let check_out = jakarta(2024, 3, 4, 17, 30);
    ctx.ledger.check_in("alice", check_in).await.unwrap();
    ctx.ledger.check_out("alice", check_out).await.unwrap();

    let history = ctx.ledger.history_for("alice").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].check_in_time, check_in);
    assert_eq!(history[0].check_out_time, Some(check_out));
    assert_eq!(history[0].status, AttendanceStatus::OnTime);
}

#[tokio::test]
async fn test_check_out_before_check_in_fails() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let result = ctx.ledger.check_out("alice", jakarta(2024, 3, 4, 17, 0)).await;
    assert!(matches!(result, Err(AttendanceError::NoOpenSession { .. })));

    // Yesterday's open record does not count as today's session.
    ctx.ledger
        .check_in("alice", jakarta(2024, 3, 3, 8, 0))
        .await
        .unwrap();
    let result = ctx.ledger.check_out("alice", jakarta(2024, 3, 4, 17, 0)).await;
    assert!(matches!(result, Err(AttendanceError::NoOpenSession { .. })));
}

#[tokio::test]
async fn test_duplicate_check_in_same_day() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    ctx.ledger
        .check_in("alice", jakarta(2024, 3, 4, 8, 0))
        .await
        .unwrap();
    let result = ctx.ledger.check_in("alice", jakarta(2024, 3, 4, 13, 0)).await;
    assert!(matches!(result, Err(AttendanceError::AlreadyCheckedIn { .. })));

    // The original record, including its status, is untouched.
    let history = ctx.ledger.history_for("alice").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, AttendanceStatus::OnTime);
}

#[tokio::test]
async fn test_concurrent_check_ins_create_one_record() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let now = jakarta(2024, 3, 4, 8, 30);
    let mut handles = Vec::new();
    for i in 0..8 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .check_in("alice", now + Duration::milliseconds(i))
                .await
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AttendanceError::AlreadyCheckedIn { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 7);
    assert_eq!(ctx.ledger.history_for("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_person_cannot_check_in() {
    let ctx = TestContext::new().await;

    let result = ctx.ledger.check_in("ghost", jakarta(2024, 3, 4, 8, 0)).await;
    assert!(matches!(result, Err(AttendanceError::NotFound(ref id)) if id == "ghost"));
    assert!(ctx.ledger.history_for("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_check_out_not_after_check_in_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let check_in = jakarta(2024, 3, 4, 8, 0);
    ctx.ledger.check_in("alice", check_in).await.unwrap();

    let result = ctx.ledger.check_out("alice", check_in).await;
    assert!(matches!(result, Err(AttendanceError::InvalidOrdering { .. })));

    // The session stays open after the rejected attempt.
    assert_eq!(
        ctx.ledger.today_status_for("alice", check_in).await.unwrap(),
        TodayStatus::CheckedIn
    );
}

#[tokio::test]
async fn test_date_bucketing_uses_jakarta_day() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    // 23:58 on the 4th and 00:02 on the 5th in Jakarta are different days.
    let before_midnight = jakarta(2024, 3, 4, 23, 58);
    let after_midnight = before_midnight + Duration::minutes(4);

    ctx.ledger.check_in("alice", before_midnight).await.unwrap();
    let next = ctx.ledger.check_in("alice", after_midnight).await.unwrap();
    assert_eq!(next.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

    let dates: Vec<NaiveDate> = ctx
        .ledger
        .history_for("alice")
        .await
        .unwrap()
        .iter()
        .map(|record| record.date)
        .collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_today_status_is_a_pure_read() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let now = jakarta(2024, 3, 4, 10, 0);
    let first = ctx.ledger.today_status_for("alice", now).await.unwrap();
    let second = ctx.ledger.today_status_for("alice", now).await.unwrap();
    assert_eq!(first, TodayStatus::NotCheckedIn);
    assert_eq!(first, second);
    assert!(ctx.ledger.history_for("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_apply_with_parsed_actions() {
    let ctx = TestContext::new().await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let check_in: AttendanceAction = "check-in".parse().unwrap();
    let check_out: AttendanceAction = "check-out".parse().unwrap();

    ctx.ledger
        .apply(check_in, "alice", jakarta(2024, 3, 4, 8, 0))
        .await
        .unwrap();
    let record = ctx
        .ledger
        .apply(check_out, "alice", jakarta(2024, 3, 4, 16, 0))
        .await
        .unwrap();
    assert_eq!(record.worked_minutes(), Some(480));

    assert!(matches!(
        "leave".parse::<AttendanceAction>(),
        Err(AttendanceError::InvalidAction(_))
    ));
}

#[tokio::test]
async fn test_overnight_grace_keeps_check_in_date_and_status() {
    let policy = LedgerPolicy::new(jakarta_offset(), NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        .with_overnight_grace(Duration::hours(12));
    let ctx = TestContext::with_policy(policy).await;
    ctx.add_person("alice", "Alice", "Ops", Role::Employee).await;

    let check_in = jakarta(2024, 3, 4, 20, 0);
    ctx.ledger.check_in("alice", check_in).await.unwrap();

    let next_morning = jakarta(2024, 3, 5, 4, 0);
    let record = ctx.ledger.check_out("alice", next_morning).await.unwrap();
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    assert_eq!(record.status, AttendanceStatus::Late);
    assert_eq!(record.check_out_time, Some(next_morning));

    // Outside the window the previous day's session is not reachable.
    ctx.ledger
        .check_in("alice", jakarta(2024, 3, 5, 8, 0))
        .await
        .unwrap();
    let result = ctx.ledger.check_out("alice", jakarta(2024, 3, 6, 9, 0)).await;
    assert!(matches!(result, Err(AttendanceError::NoOpenSession { .. })));
}

#[tokio::test]
async fn test_check_in_blocked_while_overnight_session_is_closable() {
    let policy = LedgerPolicy::new(jakarta_offset(), NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        .with_overnight_grace(Duration::hours(12));
    let ctx = TestContext::with_policy(policy).await;
    ctx.add_person("alice", "Alice", "Ops", Role::Employee).await;

    ctx.ledger
        .check_in("alice", jakarta(2024, 3, 4, 22, 0))
        .await
        .unwrap();

    assert_eq!(
        ctx.ledger
            .today_status_for("alice", jakarta(2024, 3, 5, 2, 0))
            .await
            .unwrap(),
        TodayStatus::CheckedIn
    );

    let result = ctx.ledger.check_in("alice", jakarta(2024, 3, 5, 2, 30)).await;
    assert!(matches!(
        result,
        Err(AttendanceError::AlreadyCheckedIn { date, .. })
            if date == NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    ));

    let closed = ctx
        .ledger
        .check_out("alice", jakarta(2024, 3, 5, 3, 0))
        .await
        .unwrap();
    assert_eq!(closed.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());

    let history = ctx.ledger.history_for("alice").await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_open());

    // Once the overnight session is closed, the new day starts normally.
    let next = ctx
        .ledger
        .check_in("alice", jakarta(2024, 3, 5, 8, 0))
        .await
        .unwrap();
    assert_eq!(next.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_check_ins_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("attendance.db").display());
    let ctx = TestContext::open(
        &url,
        LedgerPolicy::new(jakarta_offset(), NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
    )
    .await;
    ctx.add_person("alice", "Alice", "Finance", Role::Employee).await;

    let now = jakarta(2024, 3, 4, 8, 30);
    let mut handles = Vec::new();
    for i in 0..16 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .check_in("alice", now + Duration::milliseconds(i))
                .await
        }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AttendanceError::AlreadyCheckedIn { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(rejected, 15);
    assert_eq!(ctx.ledger.history_for("alice").await.unwrap().len(), 1);
}
