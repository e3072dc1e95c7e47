use std::ops::Range;

use async_trait::async_trait;
use bio::data_structures::interval_tree::IntervalTree;
use chrono::NaiveDate;
use tracing::debug;

use crate::domain::core::{
    AvailabilityChecker, Reservation, ReservationId, ReservationRepository, RoomId,
};
use crate::domain::{DataAccessError, Entity};
use crate::infrastructure::Table;

#[derive(Clone, Debug, Default)]
pub struct InMemoryReservationRepository {
    table: Table<Reservation>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// An availability checker reading the same reservations.
    pub fn availability(&self) -> InMemoryAvailabilityChecker {
        InMemoryAvailabilityChecker {
            table: self.table.clone(),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.table.is_empty().await
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn find_by_id(&self, id: &ReservationId) -> Result<Option<Reservation>, DataAccessError> {
        Ok(self.table.get(id).await)
    }

    async fn save(&mut self, entity: Reservation) -> Result<Reservation, DataAccessError> {
        Ok(self.table.put(entity).await)
    }
}

/// Checks a room's confirmed stays for overlap
///
/// Stays are half-open, so checking out and checking in on the same day
/// does not clash. Canceled reservations hold no nights.
#[derive(Clone, Debug)]
pub struct InMemoryAvailabilityChecker {
    table: Table<Reservation>,
}

impl InMemoryAvailabilityChecker {
    async fn overlaps(
        &self,
        room_id: &RoomId,
        stay: Range<NaiveDate>,
        ignore: Option<&ReservationId>,
    ) -> bool {
        let booked = self
            .table
            .select(|r| {
                r.room_id() == room_id && !r.is_canceled() && Some(r.id()) != ignore
            })
            .await;
        let tree: IntervalTree<NaiveDate, &ReservationId> =
            booked.iter().map(|r| (r.stay(), r.id())).collect();
        let clash = tree.find(stay).next().map(|entry| entry.data().to_string());
        if let Some(other) = &clash {
            debug!(room_id = %room_id, conflicting = %other, "stay overlaps");
        }
        clash.is_some()
    }
}

#[async_trait]
impl AvailabilityChecker for InMemoryAvailabilityChecker {
    async fn has_conflict(
        &self,
        room_id: &RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, DataAccessError> {
        if check_in >= check_out {
            return Ok(false);
        }
        Ok(self.overlaps(room_id, check_in..check_out, None).await)
    }

    async fn has_conflict_excluding(
        &self,
        room_id: &RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        reservation_id: &ReservationId,
    ) -> Result<bool, DataAccessError> {
        if check_in >= check_out {
            return Ok(false);
        }
        Ok(self
            .overlaps(room_id, check_in..check_out, Some(reservation_id))
            .await)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::core::ReservationStatus;
    use crate::domain::reserve::{ConflictReason, ReservationService, ReservationServiceError};

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn booking(id: &str, room: &str, check_in: &str, check_out: &str) -> Reservation {
        Reservation::confirmed(
            id.into(),
            "hotel-1".into(),
            room.into(),
            date(check_in),
            date(check_out),
            2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_repository_save_and_find() {
        let mut repo = InMemoryReservationRepository::new();
        let rsvp = booking("r-1", "room-12", "2026-11-03", "2026-11-07");

        assert_eq!(repo.save(rsvp.clone()).await.unwrap(), rsvp);
        assert_eq!(repo.find_by_id(&"r-1".into()).await.unwrap(), Some(rsvp.clone()));
        assert_eq!(repo.find_by_id(&"r-2".into()).await.unwrap(), None);

        let canceled = rsvp.cancel().unwrap();
        repo.save(canceled.clone()).await.unwrap();
        assert_eq!(repo.len().await, 1);
        assert_eq!(
            repo.find_by_id(&"r-1".into()).await.unwrap().map(|r| r.status()),
            Some(ReservationStatus::Canceled)
        );
    }

    #[tokio::test]
    async fn test_availability_overlap() {
        let mut repo = InMemoryReservationRepository::new();
        let availability = repo.availability();
        repo.save(booking("r-1", "room-12", "2026-11-03", "2026-11-07"))
            .await
            .unwrap();
        let room: RoomId = "room-12".into();

        assert!(availability
            .has_conflict(&room, date("2026-11-05"), date("2026-11-09"))
            .await
            .unwrap());
        assert!(availability
            .has_conflict(&room, date("2026-11-01"), date("2026-11-10"))
            .await
            .unwrap());
        // back-to-back stays on either side
        assert!(!availability
            .has_conflict(&room, date("2026-11-07"), date("2026-11-09"))
            .await
            .unwrap());
        assert!(!availability
            .has_conflict(&room, date("2026-11-01"), date("2026-11-03"))
            .await
            .unwrap());
        assert!(!availability
            .has_conflict(&"room-14".into(), date("2026-11-05"), date("2026-11-09"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_availability_ignores_canceled_and_self() {
        let mut repo = InMemoryReservationRepository::new();
        let availability = repo.availability();
        let rsvp = booking("r-1", "room-12", "2026-11-03", "2026-11-07");
        repo.save(rsvp.clone()).await.unwrap();
        let room: RoomId = "room-12".into();

        assert!(!availability
            .has_conflict_excluding(&room, date("2026-11-04"), date("2026-11-08"), &"r-1".into())
            .await
            .unwrap());
        assert!(availability
            .has_conflict_excluding(&room, date("2026-11-04"), date("2026-11-08"), &"r-2".into())
            .await
            .unwrap());

        repo.save(rsvp.cancel().unwrap()).await.unwrap();
        assert!(!availability
            .has_conflict(&room, date("2026-11-04"), date("2026-11-08"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_service_over_in_memory_adapters() {
        let repo = InMemoryReservationRepository::new();
        let availability = repo.availability();
        let mut service = ReservationService::new(repo, availability);

        service
            .create(booking("r-1", "room-12", "2026-11-03", "2026-11-07"))
            .await
            .unwrap();
        let err = service
            .create(booking("r-2", "room-12", "2026-11-06", "2026-11-08"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReservationServiceError::Conflict(ConflictReason::Overlap)
        ));

        // sliding a stay over its own nights is fine
        let edited = service
            .edit_dates(&"r-1".into(), date("2026-11-04"), date("2026-11-08"))
            .await
            .unwrap();
        assert_eq!(edited.stay(), date("2026-11-04")..date("2026-11-08"));

        service.cancel(&"r-1".into()).await.unwrap();
        service
            .create(booking("r-2", "room-12", "2026-11-06", "2026-11-08"))
            .await
            .unwrap();
        assert_eq!(service.repository().len().await, 2);
    }
}
