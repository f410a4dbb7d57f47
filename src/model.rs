use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Flotte de taxis réservables, dans l'ordre d'affichage.
pub const FLEET: [&str; 12] = [
    "HH-QQ 705",
    "HH-QQ 708",
    "HH-QQ 710",
    "HH-QQ 713",
    "HH-QQ 714",
    "HH-QQ 715",
    "HH-QQ 719",
    "HH-QQ 720",
    "HH-QQ 723",
    "HH-QQ 724",
    "HH-QQ 725",
    "HH-QQ 726",
];

/// Erreur de parsing d'une valeur de formulaire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown taxi id: {0}")]
    UnknownTaxi(String),
    #[error("unknown shift slot: {0} (expected morning or night)")]
    UnknownShift(String),
    #[error("unknown driver type: {0} (expected permanent or temporary)")]
    UnknownDriverType(String),
}

/// Identifiant fort pour l'utilisateur propriétaire
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiant fort pour un enregistrement de service, attribué par le store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immatriculation d'un taxi de la flotte. Ne peut être construite qu'à partir de [`FLEET`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct TaxiId(&'static str);

impl TaxiId {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        FLEET
            .iter()
            .copied()
            .find(|plate| *plate == raw)
            .map(Self)
            .ok_or_else(|| ParseError::UnknownTaxi(raw.to_string()))
    }

    /// Toute la flotte, dans l'ordre.
    pub fn fleet() -> impl Iterator<Item = TaxiId> {
        FLEET.iter().copied().map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0
    }
}

impl FromStr for TaxiId {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaxiId {
    type Error = ParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// Passe par `parse` : seules les plaques de `FLEET` sont acceptées.
impl<'de> Deserialize<'de> for TaxiId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

impl From<TaxiId> for String {
    fn from(value: TaxiId) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for TaxiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Créneau horaire d'un service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftSlot {
    Morning,
    Night,
}

impl ShiftSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftSlot::Morning => "morning",
            ShiftSlot::Night => "night",
        }
    }
}

impl FromStr for ShiftSlot {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(ShiftSlot::Morning),
            "night" => Ok(ShiftSlot::Night),
            other => Err(ParseError::UnknownShift(other.to_string())),
        }
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catégorie de chauffeur ; sélectionne la fenêtre de réservation applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverType {
    Permanent,
    Temporary,
}

impl DriverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverType::Permanent => "permanent",
            DriverType::Temporary => "temporary",
        }
    }
}

impl FromStr for DriverType {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Ok(DriverType::Permanent),
            "temporary" => Ok(DriverType::Temporary),
            other => Err(ParseError::UnknownDriverType(other.to_string())),
        }
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service réservé pour un jour donné
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub id: ShiftId,
    pub uid: UserId,
    pub date: NaiveDate,
    pub taxi_id: TaxiId,
    pub shift: ShiftSlot,
    pub driver_type: DriverType,
}

/// Collection de services d'un utilisateur
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShifts {
    #[serde(default)]
    pub shifts: Vec<ShiftRecord>,
}

/// Document complet persisté : une collection par utilisateur (`users.<uid>.shifts`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBook {
    #[serde(default)]
    pub users: BTreeMap<UserId, UserShifts>,
}

impl ShiftBook {
    /// Services d'un utilisateur triés par date croissante.
    pub fn shifts_for(&self, uid: &UserId) -> Vec<ShiftRecord> {
        let mut out = self
            .users
            .get(uid)
            .map(|u| u.shifts.clone())
            .unwrap_or_default();
        out.sort_by_key(|s| s.date);
        out
    }

    pub fn collection_mut(&mut self, uid: &UserId) -> &mut Vec<ShiftRecord> {
        &mut self.users.entry(uid.clone()).or_default().shifts
    }

    pub fn find_shift_mut(&mut self, uid: &UserId, id: &ShiftId) -> Option<&mut ShiftRecord> {
        self.users
            .get_mut(uid)
            .and_then(|u| u.shifts.iter_mut().find(|s| &s.id == id))
    }
}
