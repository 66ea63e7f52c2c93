//! Resolution of a booking request to exactly one quota counter.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{ExamId, QuotaId};
use seatbook_database::BookingUnit;
use seatbook_entity::{QuotaCounter, QuotaKey, StudentProfile};

/// Maps a request to the counters a booking attempt may claim from.
///
/// Runs inside the attempt's unit, before any lock is taken. Candidates are
/// tried in order and only one slot is locked at a time; all of them belong
/// to the same exam. The list is never empty.
#[async_trait]
pub trait QuotaResolver: Send + Sync {
    /// Resolve to the ordered candidate counters for `student`.
    async fn resolve(
        &self,
        unit: &mut dyn BookingUnit,
        student: &StudentProfile,
    ) -> AppResult<Vec<QuotaCounter>>;
}

/// The request shapes a student can book with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingTarget {
    /// A slot id taken from an availability listing.
    Slot {
        /// Slot to claim from.
        slot_id: QuotaId,
    },
    /// An explicit exam day; the partition must be the student's own.
    Key(QuotaKey),
    /// An exam, optionally on a preferred date. Without a date the earliest
    /// day with seats left is chosen.
    Exam {
        /// Exam to book in.
        exam_id: ExamId,
        /// Preferred exam day.
        #[serde(default)]
        preferred_date: Option<NaiveDate>,
    },
}

impl BookingTarget {
    /// Target a slot id.
    pub fn slot(slot_id: QuotaId) -> Self {
        Self::Slot { slot_id }
    }

    /// Target an exam, earliest open day or `preferred_date`.
    pub fn exam(exam_id: ExamId, preferred_date: Option<NaiveDate>) -> Self {
        Self::Exam {
            exam_id,
            preferred_date,
        }
    }
}

#[async_trait]
impl QuotaResolver for BookingTarget {
    async fn resolve(
        &self,
        unit: &mut dyn BookingUnit,
        student: &StudentProfile,
    ) -> AppResult<Vec<QuotaCounter>> {
        match self {
            Self::Slot { slot_id } => unit
                .find_counter(*slot_id)
                .await?
                .map(|c| vec![c])
                .ok_or_else(|| AppError::not_found(format!("Quota slot {slot_id} not found"))),

            Self::Key(key) => {
                if !student.matches(key.department_id, key.category) {
                    return Err(AppError::profile_mismatch(format!(
                        "Quota {key} is not reserved for student {}",
                        student.roll_no
                    )));
                }
                unit.find_counter_by_key(key)
                    .await?
                    .map(|c| vec![c])
                    .ok_or_else(|| AppError::not_found(format!("Quota {key} not found")))
            }

            Self::Exam {
                exam_id,
                preferred_date,
            } => {
                let exam = unit
                    .find_exam(*exam_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Exam {exam_id} not found")))?;

                match preferred_date {
                    Some(date) => {
                        let day_index = exam.day_index_of(*date).ok_or_else(|| {
                            AppError::validation(format!(
                                "{date} is outside the window of exam '{}'",
                                exam.name
                            ))
                        })?;
                        let key = QuotaKey::new(
                            exam.id,
                            day_index,
                            student.department_id,
                            student.category,
                        );
                        unit.find_counter_by_key(&key)
                            .await?
                            .map(|c| vec![c])
                            .ok_or_else(|| {
                                AppError::quota_exhausted(format!(
                                    "No seats for {} / {} on {date}",
                                    student.department_id, student.category
                                ))
                            })
                    }
                    None => {
                        // Every day with room, earliest first; a day that
                        // fills up before its claim falls through to the next.
                        let open = unit
                            .open_counters(exam.id, student.department_id, student.category)
                            .await?;
                        if open.is_empty() {
                            return Err(AppError::quota_exhausted(format!(
                                "No seats left in exam '{}' for {} / {}",
                                exam.name, student.department_id, student.category
                            )));
                        }
                        Ok(open)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_request_shapes() {
        let slot: BookingTarget = serde_json::from_str(
            r#"{"slot_id":"0192f0c4-6d7e-7a3b-8c1d-2e3f4a5b6c7d"}"#,
        )
        .expect("slot");
        assert!(matches!(slot, BookingTarget::Slot { .. }));

        let exam: BookingTarget = serde_json::from_str(
            r#"{"exam_id":"0192f0c4-6d7e-7a3b-8c1d-2e3f4a5b6c7d","preferred_date":"2026-11-03"}"#,
        )
        .expect("exam");
        assert!(matches!(exam, BookingTarget::Exam { preferred_date: Some(_), .. }));

        let key: BookingTarget = serde_json::from_str(
            r#"{"exam_id":"0192f0c4-6d7e-7a3b-8c1d-2e3f4a5b6c7d","day_index":1,
                "department_id":"0192f0c4-6d7e-7a3b-8c1d-2e3f4a5b6c7e","category":"DAY"}"#,
        )
        .expect("key");
        assert!(matches!(key, BookingTarget::Key(_)));
    }
}
