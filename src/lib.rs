#![forbid(unsafe_code)]
//! Taxishift — réservation de services de taxi, stockage fichier local (sans BD).
//!
//! - Fenêtres de réservation par catégorie de chauffeur.
//! - Une plage de jours devient un enregistrement par jour, écrits dans l'ordre.
//! - Abonnements annulables à la liste des services d'un utilisateur.
//! - Dates calendaires (`NaiveDate`) ; « aujourd'hui » est toujours fourni par l'appelant.

pub mod booking;
pub mod dashboard;
pub mod io;
pub mod model;
pub mod notification;
pub mod storage;
pub mod subscription;

pub use booking::{
    cancel_booking, submit_booking, submit_edit, BookingError, BookingForm, BookingPolicy,
    BookingReceipt,
};
pub use dashboard::{render_row, Dashboard};
pub use model::{DriverType, ShiftId, ShiftRecord, ShiftSlot, TaxiId, UserId, FLEET};
pub use notification::{ActionKind, Notice, Severity};
pub use storage::{JsonStore, ShiftStore, StoreError};
pub use subscription::{OnChange, Subscription};
