use super::{BookingError, BookingForm, BookingPolicy};
use crate::model::{ShiftId, UserId};
use crate::storage::ShiftStore;
use chrono::NaiveDate;

pub(super) fn submit_edit<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    id: &ShiftId,
    form: &BookingForm,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<(), BookingError> {
    let booking = form.validate()?;
    if booking.start_date != booking.end_date {
        return Err(BookingError::RangeOnEdit {
            start: booking.start_date,
            end: booking.end_date,
        });
    }
    policy.check(&booking, today)?;

    store.overwrite(
        uid,
        id,
        booking.driver_type,
        &booking.taxi_id,
        booking.start_date,
        booking.shift,
    )?;
    tracing::info!(uid = %uid, id = %id, date = %booking.start_date, "booking updated");
    Ok(())
}

pub(super) fn cancel_booking<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    id: &ShiftId,
) -> Result<(), BookingError> {
    store.delete(uid, id)?;
    tracing::info!(uid = %uid, id = %id, "booking cancelled");
    Ok(())
}
