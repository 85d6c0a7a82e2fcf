pub mod app_settings;
pub mod app_state;
pub mod calendar;
pub mod dialogs;
pub mod filter;
pub mod messages;
pub mod network;
pub mod preferences;
pub mod refresher;
pub mod schedule;
pub mod session;
