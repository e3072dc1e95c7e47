use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::DataAccessError;

use super::{ReservationId, RoomId};

/// Answers whether a room is already booked over a range of nights
#[async_trait]
pub trait AvailabilityChecker {
    /// Whether `[check_in, check_out)` overlaps an existing booking of the room
    async fn has_conflict(
        &self,
        room_id: &RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, DataAccessError>;

    /// Same as [`has_conflict`](Self::has_conflict) but disregarding one
    /// reservation, typically the one being re-dated. Checkers that cannot
    /// tell bookings apart fall back to `has_conflict`.
    async fn has_conflict_excluding(
        &self,
        room_id: &RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        _reservation_id: &ReservationId,
    ) -> Result<bool, DataAccessError> {
        self.has_conflict(room_id, check_in, check_out).await
    }
}
