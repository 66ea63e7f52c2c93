//! Concurrent booking behaviour against the in-memory store.

mod common;

use std::time::Duration;

use seatbook_core::ErrorKind;
use seatbook_core::error::AppError;
use seatbook_database::{BookingFilter, BookingStore, BookingUnit};
use seatbook_entity::{Booking, Category, DemandSpec};
use seatbook_service::BookingTarget;

use common::harness;

const PATIENT: Duration = Duration::from_secs(5);

fn outcomes(results: Vec<Result<Booking, AppError>>) -> (usize, Vec<ErrorKind>) {
    let mut ok = 0;
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(_) => ok += 1,
            Err(e) => errors.push(e.kind),
        }
    }
    (ok, errors)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_oversell_under_contention() {
    let h = harness(PATIENT);
    let cse = h.department("CSE").await;
    let students = h.students(&cse, Category::Day, 40).await;
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 5)])
        .await;

    let mut handles = Vec::new();
    for student in students {
        let coordinator = h.coordinator.clone();
        let target = BookingTarget::exam(summary.exam_id, None);
        handles.push(tokio::spawn(async move {
            coordinator.attempt_booking(&student.roll_no, &target).await
        }));
    }
    let results = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task"))
        .collect();

    let (ok, errors) = outcomes(results);
    assert_eq!(ok, 5);
    assert_eq!(errors.len(), 35);
    assert!(errors.iter().all(|k| *k == ErrorKind::QuotaExhausted));

    let counters = h.store.list_counters(summary.exam_id).await.expect("counters");
    assert_eq!(counters[0].booked(), 5);
    assert_eq!(counters[0].remaining(), 0);
    let bookings = h
        .store
        .list_bookings(&BookingFilter::default())
        .await
        .expect("bookings");
    assert_eq!(bookings.len(), 5);
}

async fn book_exam_concurrently(
    h: &common::Harness,
    students: Vec<seatbook_entity::StudentProfile>,
    exam_id: seatbook_core::types::ExamId,
) -> (usize, Vec<ErrorKind>) {
    let mut handles = Vec::new();
    for student in students {
        let coordinator = h.coordinator.clone();
        let target = BookingTarget::exam(exam_id, None);
        handles.push(tokio::spawn(async move {
            coordinator.attempt_booking(&student.roll_no, &target).await
        }));
    }
    let results = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task"))
        .collect();
    outcomes(results)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_window_fills_every_day_under_contention() {
    let h = harness(PATIENT);
    let mech = h.department("MECH").await;
    let students = h.students(&mech, Category::Day, 300).await;
    let summary = h
        .exam("Endsem", 3, vec![DemandSpec::new(mech.id, Category::Day, 300)])
        .await;

    let (ok, errors) = book_exam_concurrently(&h, students, summary.exam_id).await;
    assert_eq!(ok, 300, "unexpected rejections: {errors:?}");

    let counters = h.store.list_counters(summary.exam_id).await.expect("counters");
    assert_eq!(counters.len(), 3);
    assert!(counters.iter().all(|c| c.remaining() == 0 && c.booked() == 100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exhausted_only_when_every_day_is_full() {
    let h = harness(PATIENT);
    let civ = h.department("CIV").await;
    let students = h.students(&civ, Category::HostelMale, 40).await;
    let summary = h
        .exam(
            "Midterm",
            3,
            vec![DemandSpec::new(civ.id, Category::HostelMale, 12)],
        )
        .await;

    let (ok, errors) = book_exam_concurrently(&h, students, summary.exam_id).await;
    assert_eq!(ok, 12);
    assert_eq!(errors.len(), 28);
    assert!(errors.iter().all(|k| *k == ErrorKind::QuotaExhausted));

    let counters = h.store.list_counters(summary.exam_id).await.expect("counters");
    assert!(counters.iter().all(|c| c.remaining() == 0));
    let bookings = h
        .store
        .list_bookings(&BookingFilter {
            exam_id: Some(summary.exam_id),
            ..Default::default()
        })
        .await
        .expect("bookings");
    assert_eq!(bookings.len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_seat_goes_to_exactly_one() {
    let h = harness(PATIENT);
    let ece = h.department("ECE").await;
    let students = h.students(&ece, Category::HostelFemale, 2).await;
    let summary = h
        .exam("Quiz", 1, vec![DemandSpec::new(ece.id, Category::HostelFemale, 1)])
        .await;
    let slot = h.store.list_counters(summary.exam_id).await.expect("counters")[0].id;

    let first = {
        let coordinator = h.coordinator.clone();
        let roll = students[0].roll_no.clone();
        tokio::spawn(async move {
            coordinator
                .attempt_booking(&roll, &BookingTarget::slot(slot))
                .await
        })
    };
    let second = {
        let coordinator = h.coordinator.clone();
        let roll = students[1].roll_no.clone();
        tokio::spawn(async move {
            coordinator
                .attempt_booking(&roll, &BookingTarget::slot(slot))
                .await
        })
    };
    let (a, b) = tokio::join!(first, second);

    let (ok, errors) = outcomes(vec![a.expect("task"), b.expect("task")]);
    assert_eq!(ok, 1);
    assert_eq!(errors, vec![ErrorKind::QuotaExhausted]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_booking_per_student_per_exam() {
    let h = harness(PATIENT);
    let me = h.department("ME").await;
    let student = h.students(&me, Category::HostelMale, 1).await.remove(0);
    let summary = h
        .exam("Endsem", 3, vec![DemandSpec::new(me.id, Category::HostelMale, 30)])
        .await;
    let slots = h.store.list_counters(summary.exam_id).await.expect("counters");

    let mut handles = Vec::new();
    for i in 0..12 {
        let coordinator = h.coordinator.clone();
        let roll = student.roll_no.clone();
        let slot = slots[i % slots.len()].id;
        handles.push(tokio::spawn(async move {
            coordinator
                .attempt_booking(&roll, &BookingTarget::slot(slot))
                .await
        }));
    }
    let results = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task"))
        .collect();

    let (ok, errors) = outcomes(results);
    assert_eq!(ok, 1);
    assert!(errors.iter().all(|k| *k == ErrorKind::AlreadyBooked));

    let booked: i32 = h
        .store
        .list_counters(summary.exam_id)
        .await
        .expect("counters")
        .iter()
        .map(|c| c.booked())
        .sum();
    assert_eq!(booked, 1);
}

#[tokio::test]
async fn test_other_partition_is_rejected() {
    let h = harness(PATIENT);
    let cse = h.department("CSE").await;
    let ee = h.department("EE").await;
    let outsider = h.students(&ee, Category::Day, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 2, vec![DemandSpec::new(cse.id, Category::Day, 4)])
        .await;
    let slot = h.store.list_counters(summary.exam_id).await.expect("counters")[0].clone();

    let err = h
        .coordinator
        .attempt_booking(&outsider.roll_no, &BookingTarget::slot(slot.id))
        .await
        .expect_err("mismatch");
    assert_eq!(err.kind, ErrorKind::ProfileMismatch);

    let after = h.store.find_counter(slot.id).await.expect("find").expect("slot");
    assert_eq!(after.booked(), 0);

    let err = h
        .coordinator
        .attempt_booking(&outsider.roll_no, &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect_err("no partition");
    assert_eq!(err.kind, ErrorKind::QuotaExhausted);
}

#[tokio::test]
async fn test_lock_timeout_leaves_nothing_and_retry_succeeds() {
    let h = harness(Duration::from_millis(50));
    let cse = h.department("CSE").await;
    let student = h.students(&cse, Category::Day, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 3)])
        .await;
    let slot = h.store.list_counters(summary.exam_id).await.expect("counters")[0].id;

    let mut holder = h.store.begin().await.expect("begin");
    holder.try_claim(slot).await.expect("hold slot");

    let err = h
        .coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::slot(slot))
        .await
        .expect_err("timeout");
    assert_eq!(err.kind, ErrorKind::TransientLockTimeout);
    assert!(err.is_retryable());
    assert!(
        h.coordinator
            .bookings_for(&student.roll_no)
            .await
            .expect("bookings")
            .is_empty()
    );

    holder.rollback().await.expect("rollback");

    let booking = h
        .coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::slot(slot))
        .await
        .expect("retry");
    assert_eq!(booking.quota_id, slot);

    let err = h
        .coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::slot(slot))
        .await
        .expect_err("second retry");
    assert_eq!(err.kind, ErrorKind::AlreadyBooked);

    let counter = h.store.find_counter(slot).await.expect("find").expect("slot");
    assert_eq!(counter.booked(), 1);
}

#[tokio::test]
async fn test_unknown_student() {
    let h = harness(PATIENT);
    let cse = h.department("CSE").await;
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 3)])
        .await;

    let err = h
        .coordinator
        .attempt_booking("NOPE", &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect_err("unknown");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_hostel_student_cannot_take_day_seat() {
    let h = harness(PATIENT);
    let cse = h.department("CSE").await;
    let hosteller = h.students(&cse, Category::HostelMale, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 50)])
        .await;
    let day_slot = h.store.list_counters(summary.exam_id).await.expect("counters")[0].clone();

    let err = h
        .coordinator
        .attempt_booking(
            &hosteller.roll_no,
            &BookingTarget::Key(day_slot.key()),
        )
        .await
        .expect_err("mismatch");
    assert_eq!(err.kind, ErrorKind::ProfileMismatch);
}
