use crate::model::{DriverType, ShiftBook, ShiftId, ShiftRecord, ShiftSlot, TaxiId, UserId};
use crate::subscription::{OnChange, SubscriberRegistry, Subscription};
use anyhow::Context;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store document is corrupt: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Passerelle vers le store de services.
///
/// Toutes les opérations sont indexées par utilisateur ; les écritures notifient les
/// abonnés de la collection modifiée.
pub trait ShiftStore {
    /// Ajoute un enregistrement et renvoie l'identifiant attribué.
    fn create(
        &self,
        uid: &UserId,
        driver_type: DriverType,
        taxi_id: &TaxiId,
        date: NaiveDate,
        shift: ShiftSlot,
    ) -> Result<ShiftId, StoreError>;

    /// Remplace l'enregistrement `id` (le crée s'il n'existe pas).
    fn overwrite(
        &self,
        uid: &UserId,
        id: &ShiftId,
        driver_type: DriverType,
        taxi_id: &TaxiId,
        date: NaiveDate,
        shift: ShiftSlot,
    ) -> Result<(), StoreError>;

    /// Supprime l'enregistrement `id`. Supprimer un id absent n'est pas une erreur.
    fn delete(&self, uid: &UserId, id: &ShiftId) -> Result<(), StoreError>;

    /// Services de l'utilisateur, triés par date croissante.
    fn list(&self, uid: &UserId) -> Result<Vec<ShiftRecord>, StoreError>;

    /// Livre la liste courante puis chaque nouvelle version après un changement.
    fn subscribe(&self, uid: &UserId, on_change: OnChange) -> Result<Subscription, StoreError>;
}

/// Store fichier JSON, écrit de manière atomique après chaque mutation.
pub struct JsonStore {
    path: PathBuf,
    book: Mutex<ShiftBook>,
    /// Pris avant de relâcher `book` : les publications suivent l'ordre des écritures.
    publishing: Mutex<()>,
    subscribers: SubscriberRegistry,
}

impl JsonStore {
    /// Ouvre le fichier ; un fichier absent donne un store vide (créé à la première écriture).
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let book = if path.exists() {
            load_book(&path)?
        } else {
            ShiftBook::default()
        };
        Ok(Self {
            path,
            book: Mutex::new(book),
            publishing: Mutex::new(()),
            subscribers: SubscriberRegistry::new(),
        })
    }

    /// Applique `mutate` sur une copie, persiste, puis publie.
    /// Le document en mémoire n'est remplacé qu'une fois l'écriture réussie.
    fn commit<T>(
        &self,
        uid: &UserId,
        mutate: impl FnOnce(&mut ShiftBook) -> T,
    ) -> Result<T, StoreError> {
        let mut guard = self.lock_book()?;
        let mut next = guard.clone();
        let out = mutate(&mut next);
        save_book(&self.path, &next)?;
        let snapshot = next.shifts_for(uid);
        *guard = next;
        let _publishing = self.lock_publishing();
        drop(guard);
        self.subscribers.publish(uid, &snapshot);
        Ok(out)
    }

    fn lock_book(&self) -> Result<MutexGuard<'_, ShiftBook>, StoreError> {
        self.book
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    // Un callback qui panique ne doit pas bloquer les écritures suivantes.
    fn lock_publishing(&self) -> MutexGuard<'_, ()> {
        self.publishing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ShiftStore for JsonStore {
    fn create(
        &self,
        uid: &UserId,
        driver_type: DriverType,
        taxi_id: &TaxiId,
        date: NaiveDate,
        shift: ShiftSlot,
    ) -> Result<ShiftId, StoreError> {
        let record = ShiftRecord {
            id: ShiftId::random(),
            uid: uid.clone(),
            date,
            taxi_id: taxi_id.clone(),
            shift,
            driver_type,
        };
        let id = record.id.clone();
        self.commit(uid, |book| book.collection_mut(uid).push(record))?;
        tracing::debug!(uid = %uid, id = %id, %date, "shift created");
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
        let record = ShiftRecord {
            id: id.clone(),
            uid: uid.clone(),
            date,
            taxi_id: taxi_id.clone(),
            shift,
            driver_type,
        };
        let replaced = self.commit(uid, |book| match book.find_shift_mut(uid, id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                book.collection_mut(uid).push(record);
                false
            }
        })?;
        tracing::debug!(uid = %uid, id = %id, %date, replaced, "shift overwritten");
        Ok(())
    }

    fn delete(&self, uid: &UserId, id: &ShiftId) -> Result<(), StoreError> {
        let removed = self.commit(uid, |book| {
            let shifts = book.collection_mut(uid);
            let before = shifts.len();
            shifts.retain(|s| &s.id != id);
            before != shifts.len()
        })?;
        tracing::debug!(uid = %uid, id = %id, removed, "shift deleted");
        Ok(())
    }

    fn list(&self, uid: &UserId) -> Result<Vec<ShiftRecord>, StoreError> {
        Ok(self.lock_book()?.shifts_for(uid))
    }

    fn subscribe(&self, uid: &UserId, on_change: OnChange) -> Result<Subscription, StoreError> {
        // Même ordre de verrous que `commit` : la liste initiale précède toute publication.
        let guard = self.lock_book()?;
        let initial = guard.shifts_for(uid);
        let _publishing = self.lock_publishing();
        drop(guard);
        Ok(self.subscribers.register(uid, on_change, &initial))
    }
}

fn load_book(path: &Path) -> anyhow::Result<ShiftBook> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(ShiftBook::default());
    }
    let book: ShiftBook = serde_json::from_slice(&data)
        .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
    Ok(book)
}

fn save_book(path: &Path, book: &ShiftBook) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(book).context("serializing shift book")?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(&json).context("writing temp file")?;
    tmp.flush().context("flushing temp file")?;
    tmp.as_file().sync_all().context("syncing temp file")?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn taxi() -> TaxiId {
        TaxiId::parse("HH-QQ 719").unwrap()
    }

    #[test]
    fn create_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shifts.json");
        let uid = UserId::new("u1");
        let store = JsonStore::open(&path).unwrap();
        let id = store
            .create(&uid, DriverType::Permanent, &taxi(), day(10), ShiftSlot::Night)
            .unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        let shifts = reopened.list(&uid).unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].id, id);
        assert_eq!(shifts[0].uid, uid);
        assert_eq!(shifts[0].date, day(10));
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let dir = tempdir().unwrap();
        let uid = UserId::new("u1");
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        let id = store
            .create(&uid, DriverType::Permanent, &taxi(), day(10), ShiftSlot::Night)
            .unwrap();
        store
            .overwrite(&uid, &id, DriverType::Temporary, &taxi(), day(11), ShiftSlot::Morning)
            .unwrap();

        let shifts = store.list(&uid).unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].id, id);
        assert_eq!(shifts[0].date, day(11));
        assert_eq!(shifts[0].shift, ShiftSlot::Morning);
        assert_eq!(shifts[0].driver_type, DriverType::Temporary);
    }

    #[test]
    fn delete_missing_id_is_ok() {
        let dir = tempdir().unwrap();
        let uid = UserId::new("u1");
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        let id = store
            .create(&uid, DriverType::Permanent, &taxi(), day(10), ShiftSlot::Night)
            .unwrap();
        store.delete(&uid, &id).unwrap();
        store.delete(&uid, &id).unwrap();
        assert!(store.list(&uid).unwrap().is_empty());
    }

    #[test]
    fn collections_are_per_user() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        store
            .create(&alice, DriverType::Permanent, &taxi(), day(10), ShiftSlot::Night)
            .unwrap();
        assert_eq!(store.list(&alice).unwrap().len(), 1);
        assert!(store.list(&bob).unwrap().is_empty());
    }

    #[test]
    fn subscribers_receive_ordered_lists() {
        let dir = tempdir().unwrap();
        let uid = UserId::new("u1");
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        let seen: Arc<Mutex<Vec<Vec<NaiveDate>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let _sub = store
            .subscribe(
                &uid,
                Box::new(move |shifts: &[ShiftRecord]| {
                    sink.lock().unwrap().push(shifts.iter().map(|s| s.date).collect());
                }),
            )
            .unwrap();

        store
            .create(&uid, DriverType::Permanent, &taxi(), day(12), ShiftSlot::Night)
            .unwrap();
        store
            .create(&uid, DriverType::Permanent, &taxi(), day(10), ShiftSlot::Night)
            .unwrap();
        store
            .create(&UserId::new("other"), DriverType::Permanent, &taxi(), day(1), ShiftSlot::Night)
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_empty());
        assert_eq!(seen[1], vec![day(12)]);
        assert_eq!(seen[2], vec![day(10), day(12)]);
    }

    #[test]
    fn concurrent_writers_leave_subscribers_on_the_final_list() {
        for _ in 0..50 {
            let dir = tempdir().unwrap();
            let uid = UserId::new("u1");
            let store = JsonStore::open(dir.path().join("s.json")).unwrap();
            let last: Arc<Mutex<Vec<ShiftRecord>>> = Arc::default();
            let sink = Arc::clone(&last);
            let _sub = store
                .subscribe(
                    &uid,
                    Box::new(move |shifts: &[ShiftRecord]| {
                        *sink.lock().unwrap() = shifts.to_vec();
                    }),
                )
                .unwrap();

            std::thread::scope(|scope| {
                for worker in 0..4u32 {
                    let (store, uid) = (&store, &uid);
                    scope.spawn(move || {
                        for i in 0..5u32 {
                            let date = day(1 + worker * 5 + i);
                            store
                                .create(uid, DriverType::Temporary, &taxi(), date, ShiftSlot::Morning)
                                .unwrap();
                        }
                    });
                }
            });

            assert_eq!(store.list(&uid).unwrap().len(), 20);
            assert_eq!(*last.lock().unwrap(), store.list(&uid).unwrap());
        }
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonStore::open(&path).err().unwrap();
        assert!(err.to_string().contains("corrupt"));
    }
}
