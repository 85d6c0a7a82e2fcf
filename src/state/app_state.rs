use crate::app::MenuItem;
use crate::state::dialogs::Dialog;
use crate::state::schedule::ScheduleState;
use crate::state::session::Session;

/// Banner text shown at the top of the schedule until the next action clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Notice(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Error(text) | Banner::Notice(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub schedule: ScheduleState,
    pub dialog: Dialog,
    pub session: Session,
    pub banner: Option<Banner>,
    /// Set once the season and its reference data arrived.
    pub static_loaded: bool,
}

impl AppState {
    pub fn new(schedule: ScheduleState, session: Session) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            schedule,
            dialog: Dialog::Closed,
            session,
            banner: None,
            static_loaded: false,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.banner {
            Some(Banner::Error(message)) => Some(message),
            _ => None,
        }
    }
}
