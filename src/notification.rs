use std::fmt;

pub const ADD_SUCCESS: &str = "Shift was successfully booked!";
pub const ADD_ERROR: &str = "Shift was not successfully booked!";
pub const EDIT_SUCCESS: &str = "Shift was successfully updated!";
pub const EDIT_ERROR: &str = "Shift was not successfully updated!";
pub const DELETE_SUCCESS: &str = "Shift booking successfully cancelled!";
pub const DELETE_ERROR: &str = "Shift booking not successfully cancelled!";

/// Action en cours sur le tableau de bord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionKind {
    #[default]
    None,
    Add,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Message unique présenté à l'utilisateur à l'issue d'une action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ActionKind,
    pub severity: Severity,
    pub message: &'static str,
}

impl Notice {
    /// `None` pour `ActionKind::None`, qui n'a pas de message associé.
    pub fn for_outcome(kind: ActionKind, success: bool) -> Option<Self> {
        let message = match (kind, success) {
            (ActionKind::None, _) => return None,
            (ActionKind::Add, true) => ADD_SUCCESS,
            (ActionKind::Add, false) => ADD_ERROR,
            (ActionKind::Edit, true) => EDIT_SUCCESS,
            (ActionKind::Edit, false) => EDIT_ERROR,
            (ActionKind::Delete, true) => DELETE_SUCCESS,
            (ActionKind::Delete, false) => DELETE_ERROR,
        };
        let severity = if success {
            Severity::Success
        } else {
            Severity::Error
        };
        Some(Self {
            kind,
            severity,
            message,
        })
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}
