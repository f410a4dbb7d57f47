use super::{Booking, BookingError, BookingPolicy, Window};
use crate::model::DriverType;
use chrono::NaiveDate;

/// Écart en jours entiers entre `today` et `date` (négatif pour une date passée).
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

impl BookingPolicy {
    pub fn window(&self, driver_type: DriverType) -> Window {
        match driver_type {
            DriverType::Permanent => Window {
                min_days: Some(self.permanent_min_days),
                max_days: self.permanent_max_days,
            },
            DriverType::Temporary => Window {
                min_days: None,
                max_days: self.temporary_max_days,
            },
        }
    }

    /// Vérifie que les deux bornes de la réservation tombent dans la fenêtre.
    pub fn check(&self, booking: &Booking, today: NaiveDate) -> Result<(), BookingError> {
        let start_days = days_until(today, booking.start_date);
        let end_days = days_until(today, booking.end_date);
        let window = self.window(booking.driver_type);

        let offending = [start_days, end_days]
            .into_iter()
            .find(|days| !window.contains(*days));
        match offending {
            Some(days) => Err(BookingError::OutsideWindow {
                driver_type: booking.driver_type,
                window,
                days,
            }),
            None => Ok(()),
        }
    }
}
