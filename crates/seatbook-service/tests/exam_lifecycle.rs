//! Exam setup, lifecycle and read-path behaviour.

mod common;

use std::time::Duration;

use chrono::Days;

use seatbook_core::ErrorKind;
use seatbook_core::types::DepartmentId;
use seatbook_database::{BookingFilter, BookingStore};
use seatbook_entity::{Category, DemandSpec, ExamStatus};
use seatbook_service::{BookingTarget, NewExam};

use common::{harness, start_date};

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_initialize_reports_inventory() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let ece = h.department("ECE").await;

    let summary = h
        .exam(
            "Endsem",
            3,
            vec![
                DemandSpec::new(cse.id, Category::Day, 10),
                DemandSpec::new(ece.id, Category::HostelMale, 2),
            ],
        )
        .await;

    assert_eq!(summary.rows_created, 5);
    assert_eq!(summary.total_seats, 12);
    assert_eq!(summary.allocations[0].per_day, vec![4, 3, 3]);
    assert_eq!(summary.allocations[1].per_day, vec![1, 1, 0]);

    let exam = h.exams.get_exam(summary.exam_id).await.expect("exam");
    assert_eq!(exam.status, ExamStatus::Open);

    let quotas = h.exams.list_quotas(summary.exam_id).await.expect("quotas");
    assert_eq!(quotas.len(), 5);
    assert!(quotas.windows(2).all(|w| w[0].day_index <= w[1].day_index));
}

#[tokio::test]
async fn test_unknown_department_installs_nothing() {
    let h = harness(TIMEOUT);
    let err = h
        .exams
        .initialize_exam(NewExam {
            name: "Midterm".to_string(),
            start_date: start_date(),
            day_count: 2,
            demands: vec![DemandSpec::new(DepartmentId::new(), Category::Day, 4)],
        })
        .await
        .expect_err("unknown department");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(h.exams.list_exams().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_invalid_window_is_configuration_error() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let err = h
        .exams
        .initialize_exam(NewExam {
            name: "Midterm".to_string(),
            start_date: start_date(),
            day_count: 0,
            demands: vec![DemandSpec::new(cse.id, Category::Day, 4)],
        })
        .await
        .expect_err("zero days");
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_window_rejected_without_demands() {
    let h = harness(TIMEOUT);
    for day_count in [0, -5, 367] {
        let err = h
            .exams
            .initialize_exam(NewExam {
                name: "Empty".to_string(),
                start_date: start_date(),
                day_count,
                demands: vec![],
            })
            .await
            .expect_err("bad window");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
    assert!(h.exams.list_exams().await.expect("exams").is_empty());
}

#[tokio::test]
async fn test_closed_exam_rejects_bookings() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let student = h.students(&cse, Category::Day, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 2, vec![DemandSpec::new(cse.id, Category::Day, 4)])
        .await;

    h.exams
        .set_booking_open(summary.exam_id, false)
        .await
        .expect("close");

    let err = h
        .coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect_err("closed");
    assert_eq!(err.kind, ErrorKind::BookingClosed);
    assert!(
        h.availability
            .list_available(&student.roll_no)
            .await
            .expect("available")
            .is_empty()
    );

    h.exams
        .set_booking_open(summary.exam_id, true)
        .await
        .expect("reopen");
    h.coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect("booked after reopen");
}

#[tokio::test]
async fn test_availability_reflects_committed_bookings() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let students = h.students(&cse, Category::Day, 2).await;
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 2)])
        .await;

    let before = h
        .availability
        .list_available(&students[0].roll_no)
        .await
        .expect("available");
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].remaining, 2);

    h.coordinator
        .attempt_booking(&students[0].roll_no, &BookingTarget::slot(before[0].quota_id))
        .await
        .expect("book");

    let after = h
        .availability
        .list_available(&students[1].roll_no)
        .await
        .expect("available");
    assert_eq!(after[0].remaining, 1);

    let quotas = h.exams.list_quotas(summary.exam_id).await.expect("quotas");
    assert_eq!(quotas[0].booked, 1);

    h.coordinator
        .attempt_booking(&students[1].roll_no, &BookingTarget::slot(before[0].quota_id))
        .await
        .expect("book");
    assert!(
        h.availability
            .list_available(&students[1].roll_no)
            .await
            .expect("available")
            .is_empty()
    );
    let exams = h
        .availability
        .list_available_exams(&students[1].roll_no)
        .await
        .expect("exams");
    assert!(exams.is_empty());
}

#[tokio::test]
async fn test_preferred_date() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let students = h.students(&cse, Category::Day, 2).await;
    let summary = h
        .exam("Midterm", 3, vec![DemandSpec::new(cse.id, Category::Day, 6)])
        .await;
    let third_day = start_date().checked_add_days(Days::new(2)).expect("date");

    let booking = h
        .coordinator
        .attempt_booking(
            &students[0].roll_no,
            &BookingTarget::exam(summary.exam_id, Some(third_day)),
        )
        .await
        .expect("book");
    assert_eq!(booking.slot_date, third_day);

    let outside = start_date().checked_add_days(Days::new(10)).expect("date");
    let err = h
        .coordinator
        .attempt_booking(
            &students[1].roll_no,
            &BookingTarget::exam(summary.exam_id, Some(outside)),
        )
        .await
        .expect_err("outside window");
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_release_keeps_bookings() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let student = h.students(&cse, Category::Day, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 1, vec![DemandSpec::new(cse.id, Category::Day, 1)])
        .await;
    let booking = h
        .coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect("book");

    let counter = h.exams.release_seat(booking.quota_id).await.expect("release");
    assert_eq!(counter.booked(), 0);
    let counter = h.exams.release_seat(booking.quota_id).await.expect("release");
    assert_eq!(counter.booked(), 0);

    let bookings = h
        .exams
        .list_bookings(&BookingFilter {
            exam_id: Some(summary.exam_id),
            ..Default::default()
        })
        .await
        .expect("bookings");
    assert_eq!(bookings.len(), 1);
}

#[tokio::test]
async fn test_delete_exam_removes_everything() {
    let h = harness(TIMEOUT);
    let cse = h.department("CSE").await;
    let student = h.students(&cse, Category::Day, 1).await.remove(0);
    let summary = h
        .exam("Midterm", 2, vec![DemandSpec::new(cse.id, Category::Day, 4)])
        .await;
    h.coordinator
        .attempt_booking(&student.roll_no, &BookingTarget::exam(summary.exam_id, None))
        .await
        .expect("book");

    let report = h.exams.delete_exam(summary.exam_id).await.expect("delete");
    assert_eq!(report.counters_removed, 2);
    assert_eq!(report.bookings_removed, 1);

    assert_eq!(
        h.exams.get_exam(summary.exam_id).await.expect_err("gone").kind,
        ErrorKind::NotFound
    );
    assert!(
        h.store
            .list_bookings(&BookingFilter::default())
            .await
            .expect("bookings")
            .is_empty()
    );
    assert!(
        h.availability
            .list_available(&student.roll_no)
            .await
            .expect("available")
            .is_empty()
    );
}

#[tokio::test]
async fn test_roster_rules() {
    let h = harness(TIMEOUT);
    h.department("CSE").await;
    let err = h
        .roster
        .create_department("cse", "Duplicate")
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = h
        .roster
        .get_student("21CS404")
        .await
        .expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let cse = h.roster.department_by_code("cse").await.expect("lookup");
    h.students(&cse, Category::HostelMale, 3).await;
    assert_eq!(
        h.roster.list_students(Some("CSE")).await.expect("list").len(),
        3
    );
}
