#![allow(dead_code)]
use chrono::NaiveDate;
use std::sync::Mutex;
use taxishift::model::{DriverType, ShiftBook, ShiftId, ShiftRecord, ShiftSlot, TaxiId, UserId};
use taxishift::storage::{ShiftStore, StoreError};
use taxishift::subscription::{OnChange, SubscriberRegistry, Subscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(NaiveDate),
    Overwrite(ShiftId, NaiveDate),
    Delete(ShiftId),
}

/// Store en mémoire qui journalise les appels et peut échouer au n-ième `create`.
#[derive(Default)]
pub struct RecordingStore {
    book: Mutex<ShiftBook>,
    calls: Mutex<Vec<Call>>,
    fail_on_create: Option<usize>,
    fail_all: bool,
    subscribers: SubscriberRegistry,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Échoue sur le `create` numéro `n` (1-based).
    pub fn failing_on_create(n: usize) -> Self {
        Self {
            fail_on_create: Some(n),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_days(&self) -> Vec<NaiveDate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn records(&self, uid: &UserId) -> Vec<ShiftRecord> {
        self.book.lock().unwrap().shifts_for(uid)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_all {
            return Err(StoreError::Unavailable("offline".into()));
        }
        Ok(())
    }

    fn publish(&self, uid: &UserId) {
        let snapshot = self.records(uid);
        self.subscribers.publish(uid, &snapshot);
    }
}

impl ShiftStore for RecordingStore {
    fn create(
        &self,
        uid: &UserId,
        driver_type: DriverType,
        taxi_id: &TaxiId,
        date: NaiveDate,
        shift: ShiftSlot,
    ) -> Result<ShiftId, StoreError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Create(date));
            calls.iter().filter(|c| matches!(c, Call::Create(_))).count()
        };
        self.check_available()?;
        if self.fail_on_create == Some(attempt) {
            return Err(StoreError::Unavailable(format!("create #{attempt} refused")));
        }
        let id = ShiftId::random();
        self.book.lock().unwrap().collection_mut(uid).push(ShiftRecord {
            id: id.clone(),
            uid: uid.clone(),
            date,
            taxi_id: taxi_id.clone(),
            shift,
            driver_type,
        });
        self.publish(uid);
        Ok(id)
    }

    fn overwrite(
        &self,
        uid: &UserId,
        id: &ShiftId,
        driver_type: DriverType,
        taxi_id: &TaxiId,
        date: NaiveDate,
        shift: ShiftSlot,
    ) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Overwrite(id.clone(), date));
        self.check_available()?;
        {
            let mut book = self.book.lock().unwrap();
            let shifts = book.collection_mut(uid);
            shifts.retain(|s| &s.id != id);
            shifts.push(ShiftRecord {
                id: id.clone(),
                uid: uid.clone(),
                date,
                taxi_id: taxi_id.clone(),
                shift,
                driver_type,
            });
        }
        self.publish(uid);
        Ok(())
    }

    fn delete(&self, uid: &UserId, id: &ShiftId) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(Call::Delete(id.clone()));
        self.check_available()?;
        self.book
            .lock()
            .unwrap()
            .collection_mut(uid)
            .retain(|s| &s.id != id);
        self.publish(uid);
        Ok(())
    }

    fn list(&self, uid: &UserId) -> Result<Vec<ShiftRecord>, StoreError> {
        Ok(self.records(uid))
    }

    fn subscribe(&self, uid: &UserId, on_change: OnChange) -> Result<Subscription, StoreError> {
        let initial = self.records(uid);
        Ok(self.subscribers.register(uid, on_change, &initial))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn taxi(plate: &str) -> TaxiId {
    TaxiId::parse(plate).unwrap()
}
