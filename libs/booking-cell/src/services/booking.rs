// libs/booking-cell/src/services/booking.rs
use chrono::Utc;
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use directory_cell::FeeConfigService;
use notification_cell::{NotificationDispatcher, NotificationTemplate};
use schedule_cell::{EffectiveSession, SessionResolver};
use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{
    AdjustBookingRequest, AvailableSlotsResponse, Booking, BookingError, BookingStatus,
    CancelBookingRequest, CreateBookingRequest, FeeBreakdown, SessionKey, SlotAssignment,
};
use crate::services::allocator;
use crate::services::fees;
use crate::services::lifecycle::BookingLifecycleService;
use crate::services::locks::SessionLockRegistry;
use crate::services::store::BookingStore;

/// Orchestrates the booking flows: session resolution, serialized slot
/// allocation, fee computation, persistence, status transitions and the
/// slot-move adjustment.
pub struct BookingService {
    bookings: BookingStore,
    resolver: SessionResolver,
    fee_configs: FeeConfigService,
    lifecycle: BookingLifecycleService,
    locks: Arc<SessionLockRegistry>,
    notifier: Arc<NotificationDispatcher>,
    max_allocation_attempts: u32,
}

impl BookingService {
    pub fn new(config: &AppConfig, locks: Arc<SessionLockRegistry>) -> Self {
        let store = Arc::new(StoreClient::new(config));

        Self {
            bookings: BookingStore::new(Arc::clone(&store)),
            resolver: SessionResolver::new(Arc::clone(&store)),
            fee_configs: FeeConfigService::new(store),
            lifecycle: BookingLifecycleService::new(),
            locks,
            notifier: Arc::new(NotificationDispatcher::new(config)),
            max_allocation_attempts: 3,
        }
    }

    /// Book the next free slot for a session. Fails fast on an
    /// unconfigured or absent session and on a full session; the fee
    /// lookup happens before the allocation critical section, the
    /// confirmation notification after it commits.
    #[instrument(skip(self, request), fields(doctor_id = %request.doctor_id, date = %request.booking_date))]
    pub async fn create(&self, request: CreateBookingRequest) -> Result<Booking, BookingError> {
        info!(
            "Booking request for doctor {} at dispensary {} on {} ({})",
            request.doctor_id, request.dispensary_id, request.booking_date, request.booked_by
        );

        let session = self
            .resolver
            .resolve(request.doctor_id, request.dispensary_id, request.booking_date)
            .await?;

        let fee_breakdown = self
            .resolve_fees(request.doctor_id, request.dispensary_id, request.booked_by)
            .await?;

        let key = SessionKey {
            doctor_id: request.doctor_id,
            dispensary_id: request.dispensary_id,
            date: request.booking_date,
        };

        let mut contested_number = 0;
        for attempt in 1..=self.max_allocation_attempts {
            let lock = self.locks.lock_for(&key);
            let guard = lock.lock().await;

            let existing = self.bookings.active_for_session(&key).await?;
            let occupied = allocator::occupied_numbers(&existing, None);
            let slot = allocator::allocate(&session, &occupied).ok_or(BookingError::SessionFull {
                doctor_id: key.doctor_id,
                dispensary_id: key.dispensary_id,
                date: key.date,
                max_patients: session.max_patients,
            })?;

            let record = build_booking(&request, &slot, fee_breakdown.clone());
            let created = self.bookings.insert(&record).await?;

            // Safety net: even with per-key serialization, another writer
            // (e.g. a second process) may have taken the number between
            // our read and our write.
            let holders = self.bookings.slot_holders(&key, slot.appointment_number).await?;
            if holders.iter().all(|b| b.id == created.id) {
                drop(guard);
                info!(
                    "Booking {} created: number {} at {} for session {}",
                    created.id, created.appointment_number, created.estimated_time, key
                );
                self.notify_booking(&created, NotificationTemplate::BookingConfirmed);
                return Ok(created);
            }

            warn!(
                "Allocation race on session {} number {} (attempt {}/{}), rolling back booking {}",
                key, slot.appointment_number, attempt, self.max_allocation_attempts, created.id
            );
            contested_number = slot.appointment_number;
            self.bookings.remove(created.id).await?;
            drop(guard);

            tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64)).await;
        }

        Err(BookingError::ConcurrentAllocationConflict {
            doctor_id: key.doctor_id,
            dispensary_id: key.dispensary_id,
            date: key.date,
            appointment_number: contested_number,
        })
    }

    /// Move a scheduled booking to a new session slot, optionally under a
    /// different doctor or dispensary. Same record, same fees, same
    /// transaction id; only the session and slot fields change. The
    /// booking's own slot never blocks it when the target session is
    /// unchanged.
    #[instrument(skip(self, request), fields(booking_id = %booking_id))]
    pub async fn adjust(
        &self,
        booking_id: Uuid,
        request: AdjustBookingRequest,
    ) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;

        if current.status != BookingStatus::Scheduled {
            return Err(BookingError::InvalidTransition {
                booking_id,
                from: current.status,
                action: "adjust".to_string(),
            });
        }

        let doctor_id = request.new_doctor_id.unwrap_or(current.doctor_id);
        let dispensary_id = request.new_dispensary_id.unwrap_or(current.dispensary_id);

        let session = self
            .resolver
            .resolve(doctor_id, dispensary_id, request.new_date)
            .await?;

        let key = SessionKey {
            doctor_id,
            dispensary_id,
            date: request.new_date,
        };

        let mut contested_number = 0;
        for attempt in 1..=self.max_allocation_attempts {
            let lock = self.locks.lock_for(&key);
            let guard = lock.lock().await;

            let existing = self.bookings.active_for_session(&key).await?;
            let occupied = allocator::occupied_numbers(&existing, Some(booking_id));
            let slot = allocator::allocate(&session, &occupied).ok_or(BookingError::SessionFull {
                doctor_id: key.doctor_id,
                dispensary_id: key.dispensary_id,
                date: key.date,
                max_patients: session.max_patients,
            })?;

            let updated = self
                .bookings
                .update(
                    booking_id,
                    json!({
                        "doctor_id": doctor_id,
                        "dispensary_id": dispensary_id,
                        "booking_date": request.new_date.format("%Y-%m-%d").to_string(),
                        "appointment_number": slot.appointment_number,
                        "estimated_time": slot.estimated_time,
                        "time_slot": slot.time_slot,
                        "updated_at": Utc::now().to_rfc3339()
                    }),
                )
                .await?;

            let holders = self.bookings.slot_holders(&key, slot.appointment_number).await?;
            if holders.iter().all(|b| b.id == booking_id) {
                drop(guard);
                info!(
                    "Booking {} moved to session {} number {}",
                    booking_id, key, slot.appointment_number
                );
                return Ok(updated);
            }

            warn!(
                "Allocation race on session {} number {} while adjusting booking {} (attempt {}/{})",
                key, slot.appointment_number, booking_id, attempt, self.max_allocation_attempts
            );
            contested_number = slot.appointment_number;
            self.restore_slot_fields(&current).await?;
            drop(guard);

            tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64)).await;
        }

        Err(BookingError::ConcurrentAllocationConflict {
            doctor_id: key.doctor_id,
            dispensary_id: key.dispensary_id,
            date: key.date,
            appointment_number: contested_number,
        })
    }

    pub async fn check_in(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;
        self.lifecycle
            .validate_transition(booking_id, &current.status, &BookingStatus::CheckedIn, "check in")?;

        let now = Utc::now();
        let updated = self
            .bookings
            .update(
                booking_id,
                json!({
                    "status": BookingStatus::CheckedIn,
                    "checked_in_time": now.to_rfc3339(),
                    "is_patient_visited": true,
                    "updated_at": now.to_rfc3339()
                }),
            )
            .await?;

        info!("Booking {} checked in", booking_id);
        self.notify_booking(&updated, NotificationTemplate::BookingCheckedIn);
        Ok(updated)
    }

    pub async fn complete(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;
        self.lifecycle
            .validate_transition(booking_id, &current.status, &BookingStatus::Completed, "complete")?;

        let now = Utc::now();
        let updated = self
            .bookings
            .update(
                booking_id,
                json!({
                    "status": BookingStatus::Completed,
                    "completed_time": now.to_rfc3339(),
                    "updated_at": now.to_rfc3339()
                }),
            )
            .await?;

        info!("Booking {} completed", booking_id);
        Ok(updated)
    }

    /// Cancel from any non-terminal state. The slot is reusable the
    /// moment this commits, at its original position.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        request: CancelBookingRequest,
    ) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;
        self.lifecycle
            .validate_transition(booking_id, &current.status, &BookingStatus::Cancelled, "cancel")?;

        let notes = append_note(
            &current.notes,
            &request
                .reason
                .map(|reason| format!("Cancelled: {}", reason)),
        );

        let updated = self
            .bookings
            .update(
                booking_id,
                json!({
                    "status": BookingStatus::Cancelled,
                    "notes": notes,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!("Booking {} cancelled, number {} freed", booking_id, updated.appointment_number);
        self.notify_booking(&updated, NotificationTemplate::BookingCancelled);
        Ok(updated)
    }

    /// Transition only; deciding that the session has ended is the
    /// calling scheduler's job.
    pub async fn mark_no_show(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;
        self.lifecycle
            .validate_transition(booking_id, &current.status, &BookingStatus::NoShow, "mark no-show")?;

        let updated = self
            .bookings
            .update(
                booking_id,
                json!({
                    "status": BookingStatus::NoShow,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!("Booking {} marked no-show", booking_id);
        Ok(updated)
    }

    /// Audited cancelled → scheduled transition for the payment-reversal
    /// workflow. Requires the booking's historical slot to still exist
    /// and be free; a contested number is surfaced, never silently
    /// reallocated.
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn reinstate(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let current = self.bookings.get(booking_id).await?;
        self.lifecycle
            .validate_transition(booking_id, &current.status, &BookingStatus::Scheduled, "reinstate")?;

        let session = self
            .resolver
            .resolve(current.doctor_id, current.dispensary_id, current.booking_date)
            .await?;
        let key = current.session_key();

        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().await;

        if current.appointment_number > session.max_patients {
            return Err(BookingError::SessionFull {
                doctor_id: key.doctor_id,
                dispensary_id: key.dispensary_id,
                date: key.date,
                max_patients: session.max_patients,
            });
        }

        let existing = self.bookings.active_for_session(&key).await?;
        let occupied = allocator::occupied_numbers(&existing, None);
        if occupied.contains(&current.appointment_number) {
            warn!(
                "Cannot reinstate booking {}: number {} in session {} was reallocated",
                booking_id, current.appointment_number, key
            );
            return Err(BookingError::ConcurrentAllocationConflict {
                doctor_id: key.doctor_id,
                dispensary_id: key.dispensary_id,
                date: key.date,
                appointment_number: current.appointment_number,
            });
        }

        let notes = append_note(
            &current.notes,
            &Some("Reinstated after payment reversal".to_string()),
        );

        let updated = self
            .bookings
            .update(
                booking_id,
                json!({
                    "status": BookingStatus::Scheduled,
                    "notes": notes,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!(
            "Booking {} reinstated at number {} in session {}",
            booking_id, updated.appointment_number, key
        );
        Ok(updated)
    }

    pub async fn get(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.bookings.get(booking_id).await
    }

    /// Every free slot of one session, for display. Reserves nothing.
    pub async fn list_available_slots(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: chrono::NaiveDate,
    ) -> Result<AvailableSlotsResponse, BookingError> {
        let session = self.resolver.resolve(doctor_id, dispensary_id, date).await?;
        let key = SessionKey {
            doctor_id,
            dispensary_id,
            date,
        };

        let existing = self.bookings.active_for_session(&key).await?;
        let occupied = allocator::occupied_numbers(&existing, None);

        Ok(AvailableSlotsResponse {
            doctor_id,
            dispensary_id,
            date,
            slots: allocator::available_slots(&session, &occupied),
        })
    }

    pub async fn get_effective_session(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        date: chrono::NaiveDate,
    ) -> Result<EffectiveSession, BookingError> {
        Ok(self.resolver.resolve(doctor_id, dispensary_id, date).await?)
    }

    async fn resolve_fees(
        &self,
        doctor_id: Uuid,
        dispensary_id: Uuid,
        booked_by: shared_models::BookedBy,
    ) -> Result<FeeBreakdown, BookingError> {
        match self.fee_configs.lookup(doctor_id, dispensary_id).await {
            Ok(Some(config)) => Ok(fees::compute(&config, booked_by)),
            Ok(None) => {
                // Data-quality signal: the pair is bookable but nobody
                // configured its fees.
                warn!(
                    "No fee configuration for doctor {} at dispensary {}, writing zero fees",
                    doctor_id, dispensary_id
                );
                Ok(FeeBreakdown::zero())
            }
            Err(e) => Err(BookingError::StoreError(e.to_string())),
        }
    }

    async fn restore_slot_fields(&self, original: &Booking) -> Result<(), BookingError> {
        self.bookings
            .update(
                original.id,
                json!({
                    "doctor_id": original.doctor_id,
                    "dispensary_id": original.dispensary_id,
                    "booking_date": original.booking_date.format("%Y-%m-%d").to_string(),
                    "appointment_number": original.appointment_number,
                    "estimated_time": original.estimated_time,
                    "time_slot": original.time_slot,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;
        Ok(())
    }

    fn notify_booking(&self, booking: &Booking, template: NotificationTemplate) {
        debug!("Dispatching {} for booking {}", template, booking.id);
        self.notifier.dispatch_detached(
            booking.patient_phone.clone(),
            template,
            json!({
                "booking_id": booking.id,
                "transaction_id": booking.transaction_id,
                "patient_name": booking.patient_name,
                "booking_date": booking.booking_date,
                "appointment_number": booking.appointment_number,
                "estimated_time": booking.estimated_time,
                "time_slot": booking.time_slot
            }),
        );
    }
}

fn build_booking(
    request: &CreateBookingRequest,
    slot: &SlotAssignment,
    fees: FeeBreakdown,
) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        doctor_id: request.doctor_id,
        dispensary_id: request.dispensary_id,
        booking_date: request.booking_date,
        appointment_number: slot.appointment_number,
        estimated_time: slot.estimated_time.clone(),
        time_slot: slot.time_slot.clone(),
        status: BookingStatus::Scheduled,
        patient_name: request.patient_name.clone(),
        patient_phone: request.patient_phone.clone(),
        patient_email: request.patient_email.clone(),
        notes: request.notes.clone(),
        fees,
        booked_by: request.booked_by,
        booked_user_id: request.booked_user_id,
        transaction_id: generate_transaction_id(),
        checked_in_time: None,
        completed_time: None,
        is_patient_visited: false,
        created_at: now,
        updated_at: now,
    }
}

/// `TRX-<epochMillis>-<3-digit-random>`, unique per booking.
pub fn generate_transaction_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("TRX-{}-{:03}", millis, suffix)
}

fn append_note(existing: &Option<String>, addition: &Option<String>) -> Option<String> {
    match (existing, addition) {
        (Some(notes), Some(addition)) => Some(format!("{}\n{}", notes, addition)),
        (None, Some(addition)) => Some(addition.clone()),
        (notes, None) => notes.clone(),
    }
}
