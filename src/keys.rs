use crate::app::{App, MenuItem};
use crate::state::calendar::Projection;
use crate::state::messages::NetworkRequest;
use crate::state::network::queue_request;
use crate::state::schedule::Direction;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    let request = if guard.state.dialog.is_open() {
        handle_dialog_keys(key_event, &mut guard)
    } else {
        handle_schedule_keys(key_event, &mut guard)
    };

    drop(guard);
    queue_request(network_requests, request).await;
}

/// Keys while a dialog is open. Everything goes to the form.
fn handle_dialog_keys(key_event: KeyEvent, app: &mut App) -> Option<NetworkRequest> {
    match (key_event.code, key_event.modifiers) {
        (Char('c'), KeyModifiers::CONTROL) => quit(),
        (KeyCode::Esc, _) => app.close_dialog(),
        (KeyCode::Enter, _) => return app.submit_dialog(),
        (KeyCode::Tab | KeyCode::Down, _) => app.dialog_next_field(),
        (KeyCode::BackTab | KeyCode::Up, _) => app.dialog_prev_field(),
        (KeyCode::Left, _) => app.dialog_cycle(false),
        (KeyCode::Right, _) => app.dialog_cycle(true),
        (KeyCode::Backspace, _) => app.dialog_backspace(),
        (Char(c), _) => app.dialog_input(c),
        _ => {}
    }
    None
}

fn handle_schedule_keys(key_event: KeyEvent, app: &mut App) -> Option<NetworkRequest> {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Projections
        (MenuItem::Schedule, Char('d'), _) => return app.set_projection(Projection::Day),
        (MenuItem::Schedule, Char('w'), _) => return app.set_projection(Projection::Week),
        (MenuItem::Schedule, Char('m'), _) => return app.set_projection(Projection::Month),
        (MenuItem::Schedule, Char('y'), _) => return app.set_projection(Projection::Year),
        (MenuItem::Schedule, Char('L'), _) => return app.set_projection(Projection::List),

        // Period and cursor
        (MenuItem::Schedule, Char('['), _) => return app.navigate(false, Instant::now()),
        (MenuItem::Schedule, Char(']'), _) => return app.navigate(true, Instant::now()),
        (MenuItem::Schedule, Char('h') | KeyCode::Left, _) => return app.move_cursor(Direction::Left),
        (MenuItem::Schedule, Char('l') | KeyCode::Right, _) => return app.move_cursor(Direction::Right),
        (MenuItem::Schedule, Char('k') | KeyCode::Up, _) => return app.move_cursor(Direction::Up),
        (MenuItem::Schedule, Char('j') | KeyCode::Down, _) => return app.move_cursor(Direction::Down),
        (MenuItem::Schedule, KeyCode::Tab, _) => app.state.schedule.select_next(),
        (MenuItem::Schedule, KeyCode::BackTab, _) => app.state.schedule.select_prev(),
        (MenuItem::Schedule, KeyCode::Enter, _) => {
            if app.state.schedule.projection.drill_in().is_some() {
                return app.drill_in();
            }
            app.open_edit_dialog();
        }
        (MenuItem::Schedule, Char('t'), _) => return app.go_today(),

        // Filters
        (MenuItem::Schedule, Char('f'), _) => app.cycle_league_filter(),
        (MenuItem::Schedule, Char('F'), _) => app.cycle_team_filter(),
        (MenuItem::Schedule, Char('c'), _) => app.clear_filters(),

        // Mutations
        (MenuItem::Schedule, Char('n'), _) => app.open_create_dialog(),
        (MenuItem::Schedule, Char('e'), _) => app.open_edit_dialog(),
        (MenuItem::Schedule, Char('x') | KeyCode::Delete, _) => app.open_delete_dialog(),
        (MenuItem::Schedule, Char('s'), _) => app.open_results_dialog(),

        // Global
        (_, Char('R'), _) => return app.refresh(),
        (_, Char('o'), _) => app.logout(),
        (_, Char('z'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    None
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}
