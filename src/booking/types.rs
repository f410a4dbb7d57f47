use crate::model::{DriverType, ShiftId, ShiftRecord, ShiftSlot, TaxiId};
use crate::storage::StoreError;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Fenêtres de réservation par catégorie de chauffeur, en jours à partir d'aujourd'hui.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub permanent_min_days: i64,
    pub permanent_max_days: i64,
    pub temporary_max_days: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            permanent_min_days: 7,
            permanent_max_days: 45,
            temporary_max_days: 7,
        }
    }
}

/// Intervalle de jours autorisé ; `min_days == None` signifie pas de borne basse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub min_days: Option<i64>,
    pub max_days: i64,
}

impl Window {
    pub fn contains(&self, days: i64) -> bool {
        days <= self.max_days && self.min_days.map_or(true, |min| days >= min)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_days {
            Some(min) => write!(f, "{min}-{} days", self.max_days),
            None => write!(f, "up to {} days", self.max_days),
        }
    }
}

/// État du formulaire de réservation : un champ typé par attribut, vide tant que non saisi.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub taxi_id: Option<TaxiId>,
    pub shift: Option<ShiftSlot>,
    pub driver_type: Option<DriverType>,
}

impl BookingForm {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Formulaire pré-rempli pour l'édition d'un enregistrement (début = fin = sa date).
    pub fn from_record(record: &ShiftRecord) -> Self {
        Self {
            start_date: Some(record.date),
            end_date: Some(record.date),
            taxi_id: Some(record.taxi_id.clone()),
            shift: Some(record.shift),
            driver_type: Some(record.driver_type),
        }
    }

    /// La soumission n'est proposée que lorsque tous les champs sont renseignés.
    pub fn is_complete(&self) -> bool {
        self.start_date.is_some()
            && self.end_date.is_some()
            && self.taxi_id.is_some()
            && self.shift.is_some()
            && self.driver_type.is_some()
    }

    /// Transforme le formulaire en réservation complète.
    pub fn validate(&self) -> Result<Booking, BookingError> {
        let start_date = self.start_date.ok_or(BookingError::MissingField("start_date"))?;
        let end_date = self.end_date.ok_or(BookingError::MissingField("end_date"))?;
        let taxi_id = self
            .taxi_id
            .clone()
            .ok_or(BookingError::MissingField("taxi_id"))?;
        let shift = self.shift.ok_or(BookingError::MissingField("shift"))?;
        let driver_type = self
            .driver_type
            .ok_or(BookingError::MissingField("driver_type"))?;
        if end_date < start_date {
            return Err(BookingError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Booking {
            start_date,
            end_date,
            taxi_id,
            shift,
            driver_type,
        })
    }
}

/// Réservation validée, `start_date <= end_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub taxi_id: TaxiId,
    pub shift: ShiftSlot,
    pub driver_type: DriverType,
}

/// Résultat d'une réservation : un identifiant par jour, dans l'ordre croissant des dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub ids: Vec<ShiftId>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("{driver_type} drivers can only book {window} in advance (got {days} days)")]
    OutsideWindow {
        driver_type: DriverType,
        window: Window,
        days: i64,
    },
    #[error("edit must target a single day, got {start} to {end}")]
    RangeOnEdit { start: NaiveDate, end: NaiveDate },
    #[error("store failed on {day} after {written} day(s) written: {source}")]
    Store {
        day: NaiveDate,
        written: usize,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    StoreOp(#[from] StoreError),
}

impl BookingError {
    /// Vrai si l'erreur a été détectée avant toute écriture.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BookingError::MissingField(_)
                | BookingError::InvalidRange { .. }
                | BookingError::OutsideWindow { .. }
                | BookingError::RangeOnEdit { .. }
        )
    }
}
