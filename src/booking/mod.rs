mod expand;
mod mutate;
mod policy;
mod types;

pub use policy::days_until;
pub use types::{Booking, BookingError, BookingForm, BookingPolicy, BookingReceipt, Window};

use crate::model::{ShiftId, UserId};
use crate::storage::ShiftStore;
use chrono::NaiveDate;

/// Réserve une plage de jours : validation, fenêtre de réservation, puis une écriture par jour.
pub fn submit_booking<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    form: &BookingForm,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<BookingReceipt, BookingError> {
    expand::submit_booking(store, uid, form, today, policy)
}

/// Remplace un enregistrement existant ; le formulaire doit viser un seul jour.
pub fn submit_edit<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    id: &ShiftId,
    form: &BookingForm,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<(), BookingError> {
    mutate::submit_edit(store, uid, id, form, today, policy)
}

pub fn cancel_booking<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    id: &ShiftId,
) -> Result<(), BookingError> {
    mutate::cancel_booking(store, uid, id)
}
