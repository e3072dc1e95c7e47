use std::ops::Range;

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::domain::{DataAccessError, Entity, Id};

use super::validate_dates;

/// Reservation repository
#[async_trait]
pub trait ReservationRepository {
    /// Find a reservation by id
    async fn find_by_id(&self, id: &ReservationId) -> Result<Option<Reservation>, DataAccessError>;
    /// Store the reservation, replacing any previous record with the same id
    async fn save(&mut self, entity: Reservation) -> Result<Reservation, DataAccessError>;
}

/// Reservation id
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
#[serde(transparent)]
pub struct ReservationId(String);

impl Id for ReservationId {
    type Inner = String;
}

impl From<&str> for ReservationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<u64> for ReservationId {
    fn from(value: u64) -> Self {
        Self(format!("r-{}", value))
    }
}

/// Hotel id
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
#[serde(transparent)]
pub struct HotelId(String);

impl Id for HotelId {
    type Inner = String;
}

impl From<&str> for HotelId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Room id
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
#[serde(transparent)]
pub struct RoomId(String);

impl Id for RoomId {
    type Inner = String;
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Reservation status. `Canceled` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    #[display(fmt = "CONFIRMED")]
    Confirmed,
    #[display(fmt = "CANCELED")]
    Canceled,
}

/// Reservation entity
///
/// Values are immutable: every transition returns a new reservation and
/// leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationRecord")]
pub struct Reservation {
    id: ReservationId,
    hotel_id: HotelId,
    room_id: RoomId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    status: ReservationStatus,
}

impl Reservation {
    pub fn new(
        id: ReservationId,
        hotel_id: HotelId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
        status: ReservationStatus,
    ) -> Result<Self, ReservationError> {
        Self::validate_stay(check_in, check_out)?;
        Self::validate_guests(guests)?;
        Ok(Reservation {
            id,
            hotel_id,
            room_id,
            check_in,
            check_out,
            guests,
            status,
        })
    }

    pub fn confirmed(
        id: ReservationId,
        hotel_id: HotelId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    ) -> Result<Self, ReservationError> {
        Self::new(
            id,
            hotel_id,
            room_id,
            check_in,
            check_out,
            guests,
            ReservationStatus::Confirmed,
        )
    }

    /// The same reservation over a different stay.
    pub fn with_dates(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Self, ReservationError> {
        Self::validate_stay(check_in, check_out)?;
        Ok(Reservation {
            check_in,
            check_out,
            ..self.clone()
        })
    }

    /// The canceled counterpart of this reservation.
    pub fn cancel(&self) -> Result<Self, ReservationError> {
        self.validate_status(ReservationStatus::Canceled)?;
        Ok(Reservation {
            status: ReservationStatus::Canceled,
            ..self.clone()
        })
    }

    pub fn hotel_id(&self) -> &HotelId {
        &self.hotel_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Half-open range of occupied nights
    pub fn stay(&self) -> Range<NaiveDate> {
        self.check_in..self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn is_canceled(&self) -> bool {
        self.status == ReservationStatus::Canceled
    }

    fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ReservationError> {
        if !validate_dates(Some(check_in), Some(check_out)) {
            return Err(ReservationError::InvalidDates);
        }
        Ok(())
    }

    fn validate_guests(guests: u32) -> Result<(), ReservationError> {
        if guests < 1 {
            return Err(ReservationError::NoGuests);
        }
        Ok(())
    }

    fn validate_status(&self, status: ReservationStatus) -> Result<(), ReservationError> {
        match (self.status, status) {
            (ReservationStatus::Confirmed, ReservationStatus::Canceled) => Ok(()),
            (ReservationStatus::Canceled, _) => Err(ReservationError::AlreadyCanceled),
            _ => Err(ReservationError::InvalidStatusTransition),
        }
    }
}

impl Entity for Reservation {
    type Id = ReservationId;

    const ENTITY_NAME: &'static str = "reservation";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Deserialize)]
struct ReservationRecord {
    id: ReservationId,
    hotel_id: HotelId,
    room_id: RoomId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    #[serde(default)]
    status: ReservationStatus,
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = ReservationError;

    fn try_from(value: ReservationRecord) -> Result<Self, Self::Error> {
        Reservation::new(
            value.id,
            value.hotel_id,
            value.room_id,
            value.check_in,
            value.check_out,
            value.guests,
            value.status,
        )
    }
}

/// Reservation error
#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationError {
    /// Check-in is not strictly before check-out
    #[display(fmt = "check-in must be before check-out")]
    InvalidDates,
    /// Zero guests
    #[display(fmt = "a reservation needs at least one guest")]
    NoGuests,
    /// Canceling a canceled reservation
    #[display(fmt = "already canceled")]
    AlreadyCanceled,
    #[display(fmt = "invalid status transition")]
    InvalidStatusTransition,
}
