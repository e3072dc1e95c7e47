use chrono::NaiveDate;
use derive_more::Display;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::core::{
    AvailabilityChecker, Reservation, ReservationError, ReservationId, ReservationRepository,
};
use crate::domain::{DataAccessError, Entity};

/// Why a request clashes with current bookings
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    #[display(fmt = "dates overlap with existing reservation")]
    Overlap,
    #[display(fmt = "already canceled")]
    AlreadyCanceled,
}

#[derive(Error, Debug)]
pub enum ReservationServiceError {
    #[error("conflict: {0}")]
    Conflict(ConflictReason),
    #[error("reservation not found: {0}")]
    NotFound(ReservationId),
    #[error("invalid reservation: {0}")]
    Invalid(ReservationError),
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl From<ReservationError> for ReservationServiceError {
    fn from(value: ReservationError) -> Self {
        match value {
            ReservationError::AlreadyCanceled => Self::Conflict(ConflictReason::AlreadyCanceled),
            other => Self::Invalid(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReservationServiceError>;

/// Creates, re-dates and cancels reservations
///
/// Every guard runs before the repository is written to, so a failed call
/// never leaves a partial update behind. Nothing here serializes the
/// availability check with the save; two callers racing for the same room
/// can both succeed unless the collaborators close that gap themselves.
pub struct ReservationService<R, A> {
    repository: R,
    availability: A,
}

impl<R, A> ReservationService<R, A>
where
    R: ReservationRepository + Send + Sync,
    A: AvailabilityChecker + Send + Sync,
{
    pub fn new(repository: R, availability: A) -> Self {
        Self {
            repository,
            availability,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn availability(&self) -> &A {
        &self.availability
    }

    pub async fn create(&mut self, reservation: Reservation) -> Result<Reservation> {
        let conflict = self
            .availability
            .has_conflict(
                reservation.room_id(),
                reservation.check_in(),
                reservation.check_out(),
            )
            .await?;
        if conflict {
            warn!(
                reservation_id = %reservation.id(),
                room_id = %reservation.room_id(),
                "rejected reservation: dates overlap"
            );
            return Err(ReservationServiceError::Conflict(ConflictReason::Overlap));
        }
        let saved = self.repository.save(reservation).await?;
        info!(
            reservation_id = %saved.id(),
            room_id = %saved.room_id(),
            nights = saved.nights(),
            "reservation created"
        );
        Ok(saved)
    }

    pub async fn edit_dates(
        &mut self,
        id: &ReservationId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Reservation> {
        let existing = self.find(id).await?;
        let edited = existing.with_dates(check_in, check_out)?;
        let conflict = self
            .availability
            .has_conflict_excluding(existing.room_id(), check_in, check_out, id)
            .await?;
        if conflict {
            warn!(reservation_id = %id, room_id = %existing.room_id(), "rejected new dates: overlap");
            return Err(ReservationServiceError::Conflict(ConflictReason::Overlap));
        }
        let saved = self.repository.save(edited).await?;
        info!(
            reservation_id = %id,
            check_in = %saved.check_in(),
            check_out = %saved.check_out(),
            nights = saved.nights(),
            "reservation dates changed"
        );
        Ok(saved)
    }

    pub async fn cancel(&mut self, id: &ReservationId) -> Result<Reservation> {
        let existing = self.find(id).await?;
        let canceled = existing.cancel().map_err(|e| {
            warn!(reservation_id = %id, "rejected cancel: {}", e);
            e
        })?;
        let saved = self.repository.save(canceled).await?;
        info!(reservation_id = %id, "reservation canceled");
        Ok(saved)
    }

    pub async fn find(&self, id: &ReservationId) -> Result<Reservation> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReservationServiceError::NotFound(id.clone()))
    }
}
