//! Tableau de bord d'un utilisateur : liste vivante des services et dialogues
//! d'ajout, d'édition et d'annulation.
//!
//! Chaque tentative (ajout, édition, annulation) produit exactement une [`Notice`]
//! et ramène l'action courante à [`ActionKind::None`].

use crate::booking::{self, BookingError, BookingForm, BookingPolicy};
use crate::model::{ShiftId, ShiftRecord, UserId};
use crate::notification::{ActionKind, Notice};
use crate::storage::{ShiftStore, StoreError};
use crate::subscription::Subscription;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Feed {
    shifts: Vec<ShiftRecord>,
    loaded: bool,
}

pub struct Dashboard<'s, S: ShiftStore + ?Sized> {
    store: &'s S,
    uid: UserId,
    policy: BookingPolicy,
    action: ActionKind,
    edit_target: Option<ShiftRecord>,
    delete_target: Option<ShiftId>,
    feed: Arc<Mutex<Feed>>,
    subscription: Subscription,
}

impl<'s, S: ShiftStore + ?Sized> Dashboard<'s, S> {
    /// S'abonne à la collection de `uid`.
    pub fn open(store: &'s S, uid: UserId, policy: BookingPolicy) -> Result<Self, StoreError> {
        let feed: Arc<Mutex<Feed>> = Arc::default();
        let sink = Arc::clone(&feed);
        let subscription = store.subscribe(
            &uid,
            Box::new(move |shifts: &[ShiftRecord]| {
                let mut feed = sink.lock().unwrap_or_else(|p| p.into_inner());
                feed.shifts = shifts.to_vec();
                feed.loaded = true;
            }),
        )?;
        Ok(Self {
            store,
            uid,
            policy,
            action: ActionKind::None,
            edit_target: None,
            delete_target: None,
            feed,
            subscription,
        })
    }

    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    /// Dernière liste livrée par l'abonnement, triée par date.
    pub fn shifts(&self) -> Vec<ShiftRecord> {
        self.lock_feed().shifts.clone()
    }

    pub fn is_loading(&self) -> bool {
        !self.lock_feed().loaded
    }

    pub fn begin_add(&mut self) {
        self.action = ActionKind::Add;
        self.edit_target = None;
    }

    pub fn begin_edit(&mut self, record: ShiftRecord) {
        self.action = ActionKind::Edit;
        self.edit_target = Some(record);
    }

    pub fn begin_delete(&mut self, id: ShiftId) {
        self.action = ActionKind::Delete;
        self.delete_target = Some(id);
    }

    /// Ferme le dialogue ouvert sans rien écrire.
    pub fn dismiss(&mut self) {
        self.reset();
    }

    /// Formulaire à présenter : vide pour un ajout, pré-rempli pour une édition.
    pub fn dialog_form(&self) -> Option<BookingForm> {
        match self.action {
            ActionKind::Add => Some(BookingForm::empty()),
            ActionKind::Edit => self.edit_target.as_ref().map(BookingForm::from_record),
            ActionKind::None | ActionKind::Delete => None,
        }
    }

    /// Soumet le dialogue ouvert. `None` si aucun dialogue d'ajout ou d'édition n'est ouvert.
    pub fn submit(&mut self, form: &BookingForm, today: NaiveDate) -> Option<Notice> {
        let kind = self.action;
        let outcome = match kind {
            ActionKind::Add => {
                booking::submit_booking(self.store, &self.uid, form, today, &self.policy)
                    .map(|_| ())
            }
            ActionKind::Edit => match self.edit_target.as_ref() {
                Some(target) => booking::submit_edit(
                    self.store,
                    &self.uid,
                    &target.id,
                    form,
                    today,
                    &self.policy,
                ),
                None => return None,
            },
            ActionKind::None | ActionKind::Delete => return None,
        };
        self.finish(kind, outcome)
    }

    /// Confirme l'annulation ciblée par `begin_delete`.
    pub fn confirm_delete(&mut self) -> Option<Notice> {
        if self.action != ActionKind::Delete {
            return None;
        }
        let Some(id) = self.delete_target.take() else {
            self.reset();
            return None;
        };
        let outcome = booking::cancel_booking(self.store, &self.uid, &id);
        self.finish(ActionKind::Delete, outcome)
    }

    /// Annule l'abonnement.
    pub fn close(mut self) {
        self.subscription.cancel();
    }

    fn finish(&mut self, kind: ActionKind, outcome: Result<(), BookingError>) -> Option<Notice> {
        let ok = match outcome {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    uid = %self.uid,
                    action = ?kind,
                    validation = err.is_validation(),
                    error = %err,
                    "action failed"
                );
                false
            }
        };
        self.reset();
        Notice::for_outcome(kind, ok)
    }

    fn reset(&mut self) {
        self.action = ActionKind::None;
        self.edit_target = None;
        self.delete_target = None;
    }

    fn lock_feed(&self) -> std::sync::MutexGuard<'_, Feed> {
        self.feed.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Ligne de liste : `MM/DD/YY | taxi | <créneau> Shift | <catégorie> Driver`.
pub fn render_row(record: &ShiftRecord) -> String {
    format!(
        "{} | {} | {} Shift | {} Driver",
        record.date.format("%m/%d/%y"),
        record.taxi_id,
        record.shift,
        record.driver_type
    )
}
