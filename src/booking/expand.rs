use super::{BookingError, BookingForm, BookingPolicy, BookingReceipt};
use crate::model::UserId;
use crate::storage::ShiftStore;
use chrono::NaiveDate;

/// Valide puis écrit un enregistrement par jour de `[start_date, end_date]`.
///
/// Les écritures sont séquentielles, par date croissante. Un échec du store au jour k
/// laisse les jours précédents en place.
pub(super) fn submit_booking<S: ShiftStore + ?Sized>(
    store: &S,
    uid: &UserId,
    form: &BookingForm,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<BookingReceipt, BookingError> {
    let booking = form.validate()?;
    policy.check(&booking, today)?;

    let mut ids = Vec::new();
    let mut current = booking.start_date;

    loop {
        let id = store
            .create(
                uid,
                booking.driver_type,
                &booking.taxi_id,
                current,
                booking.shift,
            )
            .map_err(|source| BookingError::Store {
                day: current,
                written: ids.len(),
                source,
            })?;
        ids.push(id);

        if current >= booking.end_date {
            break;
        }
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = next;
    }

    tracing::info!(
        uid = %uid,
        start = %booking.start_date,
        end = %booking.end_date,
        days = ids.len(),
        "booking written"
    );
    Ok(BookingReceipt { ids })
}
