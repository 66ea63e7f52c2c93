//! PostgreSQL booking store tests.
//!
//! Each test gets a fresh database from `#[sqlx::test]` with the workspace
//! migrations applied. They need `DATABASE_URL` and are ignored by default:
//! `cargo test -p seatbook-database -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::PgPool;

use seatbook_core::ErrorKind;
use seatbook_database::{BookingFilter, BookingStore, BookingUnit, ClaimOutcome, PgBookingStore};
use seatbook_entity::{
    Booking, Category, Department, ExamStatus, ExamWindow, QuotaCounter, QuotaKey, StudentProfile,
};

struct Fixture {
    store: Arc<PgBookingStore>,
    exam: ExamWindow,
    slot: QuotaCounter,
    students: Vec<StudentProfile>,
}

async fn fixture(pool: PgPool, capacity: u32, students: usize, lock_timeout: Duration) -> Fixture {
    let store = Arc::new(PgBookingStore::new(pool, lock_timeout));
    let dept = store
        .insert_department(&Department::new("CSE", "Computer Science"))
        .await
        .expect("department");

    let mut profiles = Vec::with_capacity(students);
    for n in 0..students {
        let student = store
            .insert_student(&StudentProfile::new(
                &format!("21CS{n:03}"),
                "Student",
                None,
                dept.id,
                Category::Day,
            ))
            .await
            .expect("student");
        profiles.push(student);
    }

    let start = NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date");
    let exam = ExamWindow::new("Midterm", start, 1);
    let slot = QuotaCounter::new(QuotaKey::new(exam.id, 0, dept.id, Category::Day), start, capacity)
        .expect("counter");
    let exam = store
        .install_plan(&exam, std::slice::from_ref(&slot))
        .await
        .expect("install");

    Fixture {
        store,
        exam,
        slot,
        students: profiles,
    }
}

/// Claim and book in one unit, committing only on success.
async fn book(store: &PgBookingStore, student: &StudentProfile, slot: &QuotaCounter) -> ErrorKindOr {
    let mut unit = store.begin().await.expect("begin");
    let outcome = match unit.try_claim(slot.id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            unit.rollback().await.expect("rollback");
            return ErrorKindOr::Err(e.kind);
        }
    };
    let ClaimOutcome::Claimed(claimed) = outcome else {
        unit.rollback().await.expect("rollback");
        return ErrorKindOr::Exhausted;
    };
    match unit.insert_booking(&Booking::for_claim(student.id, &claimed)).await {
        Ok(_) => {
            unit.commit().await.expect("commit");
            ErrorKindOr::Booked
        }
        Err(e) => {
            unit.rollback().await.expect("rollback");
            ErrorKindOr::Err(e.kind)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ErrorKindOr {
    Booked,
    Exhausted,
    Err(ErrorKind),
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_install_opens_exam(pool: PgPool) {
    let fx = fixture(pool, 3, 0, Duration::from_secs(2)).await;
    assert_eq!(fx.exam.status, ExamStatus::Open);
    let counters = fx.store.list_counters(fx.exam.id).await.expect("counters");
    assert_eq!(counters.len(), 1);
    assert_eq!(counters[0].capacity(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_no_oversell(pool: PgPool) {
    let fx = fixture(pool, 3, 12, Duration::from_secs(5)).await;

    let mut handles = Vec::new();
    for student in fx.students.clone() {
        let store = Arc::clone(&fx.store);
        let slot = fx.slot.clone();
        handles.push(tokio::spawn(async move { book(&store, &student, &slot).await }));
    }

    let mut booked = 0;
    for handle in handles {
        match handle.await.expect("task") {
            ErrorKindOr::Booked => booked += 1,
            ErrorKindOr::Exhausted => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(booked, 3);

    let counter = fx
        .store
        .find_counter(fx.slot.id)
        .await
        .expect("find")
        .expect("slot");
    assert_eq!(counter.booked(), 3);
    let bookings = fx
        .store
        .list_bookings(&BookingFilter::default())
        .await
        .expect("bookings");
    assert_eq!(bookings.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_booking_rolls_back_claim(pool: PgPool) {
    let fx = fixture(pool, 5, 1, Duration::from_secs(2)).await;
    let student = &fx.students[0];

    assert_eq!(book(&fx.store, student, &fx.slot).await, ErrorKindOr::Booked);
    assert_eq!(
        book(&fx.store, student, &fx.slot).await,
        ErrorKindOr::Err(ErrorKind::AlreadyBooked)
    );

    let counter = fx
        .store
        .find_counter(fx.slot.id)
        .await
        .expect("find")
        .expect("slot");
    assert_eq!(counter.booked(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_held_row_times_out(pool: PgPool) {
    let fx = fixture(pool, 5, 1, Duration::from_millis(100)).await;

    let mut holder = fx.store.begin().await.expect("begin");
    holder.try_claim(fx.slot.id).await.expect("hold");

    assert_eq!(
        book(&fx.store, &fx.students[0], &fx.slot).await,
        ErrorKindOr::Err(ErrorKind::TransientLockTimeout)
    );

    holder.rollback().await.expect("rollback");
    assert_eq!(
        book(&fx.store, &fx.students[0], &fx.slot).await,
        ErrorKindOr::Booked
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_release_and_teardown(pool: PgPool) {
    let fx = fixture(pool, 2, 1, Duration::from_secs(2)).await;
    assert_eq!(book(&fx.store, &fx.students[0], &fx.slot).await, ErrorKindOr::Booked);

    let released = fx.store.release(fx.slot.id).await.expect("release");
    assert_eq!(released.booked(), 0);
    let released = fx.store.release(fx.slot.id).await.expect("release");
    assert_eq!(released.booked(), 0);

    let report = fx.store.teardown_exam(fx.exam.id).await.expect("teardown");
    assert_eq!(report.counters_removed, 1);
    assert_eq!(report.bookings_removed, 1);
    assert!(fx.store.find_exam(fx.exam.id).await.expect("find").is_none());
}
