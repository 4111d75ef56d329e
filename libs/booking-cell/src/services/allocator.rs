// libs/booking-cell/src/services/allocator.rs
//
// Slot math for one session. Pure functions over the effective session
// parameters and the set of occupied appointment numbers; the single
// source of truth used by creation, adjustment, reinstatement and the
// display listing.

use chrono::Duration;
use std::collections::HashSet;
use uuid::Uuid;

use schedule_cell::EffectiveSession;

use crate::models::{Booking, BookingStatus, SlotAssignment};

/// Appointment numbers held by non-cancelled bookings, minus the booking
/// being moved when a reschedule passes its own id.
pub fn occupied_numbers(bookings: &[Booking], exclude_booking_id: Option<Uuid>) -> HashSet<i32> {
    bookings
        .iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .filter(|b| Some(b.id) != exclude_booking_id)
        .map(|b| b.appointment_number)
        .collect()
}

/// First-fit with gap reuse: the smallest appointment number not in the
/// occupied set, bounded by session capacity. Numbers freed by
/// cancellation become assignable again at their original position.
/// Returns None when the session is full.
pub fn allocate(session: &EffectiveSession, occupied: &HashSet<i32>) -> Option<SlotAssignment> {
    if occupied.len() as i32 >= session.max_patients {
        return None;
    }

    let number = (1..=session.max_patients).find(|n| !occupied.contains(n))?;
    Some(assignment_for(session, number))
}

/// Estimated window for a given appointment number: the session start
/// plus (n-1) pacing intervals, at minute resolution. Capacity beyond
/// the nominal end time is accepted here; bounding capacity is
/// `max_patients`' job, not the session length's.
pub fn assignment_for(session: &EffectiveSession, appointment_number: i32) -> SlotAssignment {
    let offset = Duration::minutes((appointment_number as i64 - 1) * session.minutes_per_patient as i64);
    let start = session.start_time + offset;
    let end = start + Duration::minutes(session.minutes_per_patient as i64);

    SlotAssignment {
        appointment_number,
        estimated_time: start.format("%H:%M").to_string(),
        time_slot: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
    }
}

/// Every free slot, in order, for display. Reserves nothing. On top of
/// the capacity bound this caps at what fits in the nominal session
/// length, so the UI never shows windows past closing time.
pub fn available_slots(session: &EffectiveSession, occupied: &HashSet<i32>) -> Vec<SlotAssignment> {
    let fits_in_session = (session.session_length_minutes() / session.minutes_per_patient as i64) as i32;
    let display_max = session.max_patients.min(fits_in_session);

    (1..=display_max)
        .filter(|n| !occupied.contains(n))
        .map(|n| assignment_for(session, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn session(max_patients: i32, minutes_per_patient: i32) -> EffectiveSession {
        EffectiveSession {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            max_patients,
            minutes_per_patient,
            booking_cutover_minutes: 60,
        }
    }

    #[test]
    fn assigns_smallest_free_number() {
        let s = session(4, 30);

        let slot = allocate(&s, &HashSet::new()).unwrap();
        assert_eq!(slot.appointment_number, 1);
        assert_eq!(slot.estimated_time, "09:00");
        assert_eq!(slot.time_slot, "09:00-09:30");

        let slot = allocate(&s, &HashSet::from([1, 2])).unwrap();
        assert_eq!(slot.appointment_number, 3);
        assert_eq!(slot.estimated_time, "10:00");
    }

    #[test]
    fn reuses_gap_left_by_cancellation() {
        let s = session(4, 30);

        let slot = allocate(&s, &HashSet::from([1, 3, 4])).unwrap();
        assert_eq!(slot.appointment_number, 2);
        assert_eq!(slot.estimated_time, "09:30");
        assert_eq!(slot.time_slot, "09:30-10:00");
    }

    #[test]
    fn refuses_full_session() {
        let s = session(4, 30);
        assert!(allocate(&s, &HashSet::from([1, 2, 3, 4])).is_none());
    }

    #[test]
    fn sequential_windows_follow_pacing() {
        let s = session(4, 30);
        let mut occupied = HashSet::new();
        let expected = ["09:00", "09:30", "10:00", "10:30"];

        for estimated in expected {
            let slot = allocate(&s, &occupied).unwrap();
            assert_eq!(slot.estimated_time, estimated);
            occupied.insert(slot.appointment_number);
        }

        assert!(allocate(&s, &occupied).is_none());
    }

    #[test]
    fn capacity_may_exceed_session_length() {
        // 2h session at 30min pacing fits 4, but capacity 6 governs.
        let s = session(6, 30);
        let slot = allocate(&s, &HashSet::from([1, 2, 3, 4, 5])).unwrap();
        assert_eq!(slot.appointment_number, 6);
        assert_eq!(slot.estimated_time, "11:30");
    }

    #[test]
    fn display_listing_caps_at_session_length() {
        let s = session(6, 30);
        let slots = available_slots(&s, &HashSet::new());
        // Allocation would go to 6, display stops at what fits before 11:00.
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.last().unwrap().time_slot, "10:30-11:00");
    }

    #[test]
    fn display_listing_skips_occupied_numbers() {
        let s = session(4, 30);
        let slots = available_slots(&s, &HashSet::from([2]));
        let numbers: Vec<i32> = slots.iter().map(|s| s.appointment_number).collect();
        assert_eq!(numbers, vec![1, 3, 4]);
    }

    #[test]
    fn occupied_set_ignores_cancelled_and_excluded() {
        use crate::models::{Booking, FeeBreakdown};
        use chrono::{NaiveDate, Utc};
        use shared_models::BookedBy;

        let make = |number: i32, status: BookingStatus| Booking {
            id: Uuid::new_v4(),
            doctor_id: Uuid::nil(),
            dispensary_id: Uuid::nil(),
            booking_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            appointment_number: number,
            estimated_time: "09:00".to_string(),
            time_slot: "09:00-09:30".to_string(),
            status,
            patient_name: "Test Patient".to_string(),
            patient_phone: "+94770000000".to_string(),
            patient_email: None,
            notes: None,
            fees: FeeBreakdown::zero(),
            booked_by: BookedBy::Online,
            booked_user_id: Uuid::nil(),
            transaction_id: "TRX-0-000".to_string(),
            checked_in_time: None,
            completed_time: None,
            is_patient_visited: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let kept = make(1, BookingStatus::Scheduled);
        let cancelled = make(2, BookingStatus::Cancelled);
        let moved = make(3, BookingStatus::Scheduled);
        let moved_id = moved.id;

        let occupied = occupied_numbers(&[kept, cancelled, moved], Some(moved_id));
        assert_eq!(occupied, HashSet::from([1]));
    }
}
