use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Banner};
use crate::state::calendar::{DisplayZone, Projection};
use crate::state::dialogs::{DeleteConfirm, Dialog, DialogState, GameForm, GameFormMode, ResultsForm};
use crate::state::messages::{Mutation, NetworkRequest};
use crate::state::preferences::ViewPreferences;
use crate::state::schedule::{Direction, ScheduleState};
use crate::state::session::Session;
use chrono::NaiveDate;
use draco_api::{ApiError, Field, Game, LeagueSeason, Season, ViewWindow};
use log::{debug, info, warn};
use std::time::Instant;

pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please log in again.";

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Schedule,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    persist_view: bool,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let zone = DisplayZone::Local;
        Self::with_zone(settings, zone, zone.today())
    }

    pub fn with_zone(settings: AppSettings, zone: DisplayZone, today: NaiveDate) -> Self {
        let mut schedule = ScheduleState::new(today, zone);
        schedule.set_projection(settings.default_view);
        let session = Session::from_settings(&settings);

        let app = Self { state: AppState::new(schedule, session), settings, persist_view: false };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    /// Restore the saved view for this account and keep saving changes to it.
    pub fn restore_view(&mut self) {
        self.persist_view = true;
        let account = self.state.session.account_id();
        if account.is_empty() {
            return;
        }
        match ViewPreferences::load(account) {
            Ok(prefs) => {
                let schedule = &mut self.state.schedule;
                schedule.set_projection(prefs.projection);
                schedule.filter_type = prefs.filter_type;
                schedule.filter = prefs.filter;
            }
            Err(e) => debug!("no saved view for account {account}: {e}"),
        }
    }

    fn save_view(&self) {
        let account = self.state.session.account_id();
        if !self.persist_view || account.is_empty() {
            return;
        }
        let schedule = &self.state.schedule;
        let prefs = ViewPreferences {
            projection: schedule.projection,
            filter_type: schedule.filter_type,
            filter: schedule.filter.clone(),
        };
        if let Err(e) = prefs.save(account) {
            warn!("could not save view: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers: called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn start(&mut self) -> NetworkRequest {
        self.state.banner = None;
        NetworkRequest::LoadStaticData
    }

    pub fn on_static_loaded(
        &mut self,
        season: Season,
        leagues: Vec<LeagueSeason>,
        fields: Vec<Field>,
    ) -> Option<NetworkRequest> {
        info!(
            "season {} loaded with {} leagues and {} fields",
            season.name,
            leagues.len(),
            fields.len()
        );
        self.state.schedule.apply_static(season, leagues, fields);
        self.state.static_loaded = true;
        self.reload_games()
    }

    pub fn on_games_loaded(&mut self, generation: u64, window: ViewWindow, games: Vec<Game>) {
        let count = games.len();
        if !self.state.schedule.apply_games(generation, window, games) {
            debug!("discarding stale games for {} (generation {generation})", window.title());
            return;
        }
        debug!("{count} games loaded for {}", window.title());
        if self.state.banner.as_ref().is_some_and(Banner::is_error) {
            self.state.banner = None;
        }
    }

    /// Keeps the last good games on screen.
    pub fn on_games_failed(&mut self, generation: u64, message: String) {
        if !self.state.schedule.is_current(generation) {
            debug!("ignoring failure of superseded games load {generation}");
            return;
        }
        self.state.banner = Some(Banner::Error(message));
    }

    pub fn on_mutation_succeeded(&mut self, mutation: Mutation) -> Option<NetworkRequest> {
        info!("{}", mutation.success_message());
        self.state.dialog = Dialog::Closed;
        if let Mutation::Delete { game_id } = &mutation {
            self.state.schedule.remove_game(game_id);
        }
        self.state.banner = Some(Banner::Notice(mutation.success_message().to_string()));
        self.reload_games()
    }

    pub fn on_mutation_failed(&mut self, mutation: Mutation, error: ApiError) {
        if matches!(mutation, Mutation::Delete { .. }) && error.is_unauthorized() {
            self.state.dialog = Dialog::Closed;
            self.state.banner = Some(Banner::Error(AUTH_FAILED_MESSAGE.to_string()));
            return;
        }

        let message = error.user_message(mutation.fallback_message());
        if self.state.dialog.is_open() {
            let dialog = std::mem::take(&mut self.state.dialog);
            self.state.dialog = dialog.into_failed(message);
        } else {
            self.state.banner = Some(Banner::Error(message));
        }
    }

    pub fn on_error(&mut self, message: String) {
        self.state.banner = Some(Banner::Error(message));
    }

    // -----------------------------------------------------------------------
    // Reloads
    // -----------------------------------------------------------------------

    pub fn reload_games(&mut self) -> Option<NetworkRequest> {
        self.state.schedule.request_games().map(NetworkRequest::LoadGames)
    }

    /// Manual refresh. Retries the season lookup when that is what failed.
    pub fn refresh(&mut self) -> Option<NetworkRequest> {
        self.state.banner = None;
        if !self.state.static_loaded {
            return Some(NetworkRequest::LoadStaticData);
        }
        self.reload_games()
    }

    /// Periodic reload; skipped while a dialog is waiting on the server.
    pub fn on_refresh_tick(&mut self) -> Option<NetworkRequest> {
        if self.state.dialog.is_submitting() {
            return None;
        }
        if !self.state.static_loaded {
            return Some(NetworkRequest::LoadStaticData);
        }
        self.reload_games()
    }

    fn fetch_if_needed(&mut self) -> Option<NetworkRequest> {
        if self.state.static_loaded && self.state.schedule.needs_fetch() {
            return self.reload_games();
        }
        None
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Schedule navigation: delegated to ScheduleState
    // -----------------------------------------------------------------------

    pub fn set_projection(&mut self, projection: Projection) -> Option<NetworkRequest> {
        self.state.schedule.set_projection(projection);
        self.save_view();
        self.fetch_if_needed()
    }

    pub fn navigate(&mut self, forward: bool, now: Instant) -> Option<NetworkRequest> {
        if !self.state.schedule.navigate(forward, now) {
            debug!("navigation dropped by debounce");
            return None;
        }
        self.fetch_if_needed()
    }

    pub fn move_cursor(&mut self, direction: Direction) -> Option<NetworkRequest> {
        self.state.schedule.move_cursor(direction);
        self.fetch_if_needed()
    }

    pub fn drill_in(&mut self) -> Option<NetworkRequest> {
        if !self.state.schedule.drill_in() {
            return None;
        }
        self.save_view();
        self.fetch_if_needed()
    }

    pub fn go_today(&mut self) -> Option<NetworkRequest> {
        let today = self.state.schedule.zone.today();
        self.state.schedule.go_today(today);
        self.fetch_if_needed()
    }

    pub fn cycle_league_filter(&mut self) {
        let schedule = &mut self.state.schedule;
        schedule.filter.cycle_league(&schedule.leagues);
        schedule.selected_game = 0;
        self.save_view();
    }

    pub fn cycle_team_filter(&mut self) {
        let schedule = &mut self.state.schedule;
        schedule.filter.cycle_team(&schedule.leagues);
        schedule.selected_game = 0;
        self.save_view();
    }

    pub fn clear_filters(&mut self) {
        self.state.schedule.filter.clear();
        self.state.schedule.selected_game = 0;
        self.save_view();
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn logout(&mut self) {
        self.state.session.logout();
        self.settings.token = None;
        self.state.dialog = Dialog::Closed;
        self.state.banner = Some(Banner::Notice("Logged out".to_string()));
        info!("session closed for account {}", self.state.session.account_id());
    }

    fn require_editor(&mut self) -> bool {
        if self.state.session.can_edit_schedule() {
            return true;
        }
        let message = if self.state.session.is_authenticated() {
            "You do not have permission to manage games"
        } else {
            "Log in to manage games"
        };
        self.state.banner = Some(Banner::Error(message.to_string()));
        false
    }

    fn selected_game(&mut self) -> Option<Game> {
        let game = self.state.schedule.selected().cloned();
        if game.is_none() {
            self.state.banner = Some(Banner::Notice("Select a game first".to_string()));
        }
        game
    }

    // -----------------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------------

    pub fn open_create_dialog(&mut self) {
        if !self.require_editor() {
            return;
        }
        let schedule = &self.state.schedule;
        let league = schedule
            .filter
            .league()
            .map(str::to_owned)
            .or_else(|| schedule.leagues.first().map(|l| l.id.clone()));
        let form = GameForm::create(schedule.anchor, league);
        self.state.dialog = Dialog::Game(DialogState::Open(form));
    }

    pub fn open_edit_dialog(&mut self) {
        if !self.require_editor() {
            return;
        }
        let Some(game) = self.selected_game() else {
            return;
        };
        let form = GameForm::edit(&game, &self.state.schedule.zone);
        self.state.dialog = Dialog::Game(DialogState::Open(form));
    }

    pub fn open_delete_dialog(&mut self) {
        if !self.require_editor() {
            return;
        }
        let Some(game) = self.selected_game() else {
            return;
        };
        let schedule = &self.state.schedule;
        let when = schedule.zone.naive(game.game_date).format("%a %b %-d, %H:%M");
        let summary = format!("{} on {when}", schedule.matchup(&game));
        self.state.dialog = Dialog::Delete(DialogState::Open(DeleteConfirm { game_id: game.id, summary }));
    }

    pub fn open_results_dialog(&mut self) {
        if !self.require_editor() {
            return;
        }
        let Some(game) = self.selected_game() else {
            return;
        };
        let form = ResultsForm::for_game(&game, self.state.schedule.matchup(&game));
        self.state.dialog = Dialog::Results(DialogState::Open(form));
    }

    /// Closing is refused while the server has not answered yet.
    pub fn close_dialog(&mut self) {
        if !self.state.dialog.is_submitting() {
            self.state.dialog = Dialog::Closed;
        }
    }

    pub fn dialog_input(&mut self, c: char) {
        match &mut self.state.dialog {
            Dialog::Game(s) => s.form_mut().into_iter().for_each(|f| f.input_char(c)),
            Dialog::Results(s) => s.form_mut().into_iter().for_each(|f| f.input_char(c)),
            Dialog::Delete(_) | Dialog::Closed => {}
        }
    }

    pub fn dialog_backspace(&mut self) {
        match &mut self.state.dialog {
            Dialog::Game(s) => s.form_mut().into_iter().for_each(GameForm::backspace),
            Dialog::Results(s) => s.form_mut().into_iter().for_each(ResultsForm::backspace),
            Dialog::Delete(_) | Dialog::Closed => {}
        }
    }

    pub fn dialog_next_field(&mut self) {
        match &mut self.state.dialog {
            Dialog::Game(s) => s.form_mut().into_iter().for_each(GameForm::next_field),
            Dialog::Results(s) => s.form_mut().into_iter().for_each(ResultsForm::next_field),
            Dialog::Delete(_) | Dialog::Closed => {}
        }
    }

    pub fn dialog_prev_field(&mut self) {
        match &mut self.state.dialog {
            Dialog::Game(s) => s.form_mut().into_iter().for_each(GameForm::prev_field),
            Dialog::Results(s) => s.form_mut().into_iter().for_each(ResultsForm::prev_field),
            Dialog::Delete(_) | Dialog::Closed => {}
        }
    }

    pub fn dialog_cycle(&mut self, forward: bool) {
        let schedule = &self.state.schedule;
        match &mut self.state.dialog {
            Dialog::Game(s) => {
                if let Some(form) = s.form_mut() {
                    form.cycle_choice(forward, &schedule.leagues, &schedule.fields);
                }
            }
            Dialog::Results(s) => {
                if let Some(form) = s.form_mut() {
                    form.cycle_choice(forward);
                }
            }
            Dialog::Delete(_) | Dialog::Closed => {}
        }
    }

    /// Validate the open dialog and turn it into a request. Invalid input
    /// stays in the dialog with a message and nothing is sent.
    pub fn submit_dialog(&mut self) -> Option<NetworkRequest> {
        if !self.state.dialog.is_open() || self.state.dialog.is_submitting() {
            return None;
        }

        let Some(season_id) = self.state.schedule.season.as_ref().map(|s| s.id.clone()) else {
            self.fail_dialog("No current season is loaded");
            return None;
        };
        let Some(token) = self.state.session.token().map(str::to_owned) else {
            self.fail_dialog(AUTH_FAILED_MESSAGE);
            return None;
        };

        let request = match &self.state.dialog {
            Dialog::Closed => return None,
            Dialog::Game(s) => {
                let form = s.form();
                match form.validate(&self.state.schedule.zone) {
                    Ok(draft) => match &form.mode {
                        GameFormMode::Create => NetworkRequest::CreateGame { token, season_id, draft },
                        GameFormMode::Edit { game_id } => NetworkRequest::UpdateGame {
                            token,
                            season_id,
                            game_id: game_id.clone(),
                            draft,
                        },
                    },
                    Err(e) => {
                        self.fail_dialog(e.to_string());
                        return None;
                    }
                }
            }
            Dialog::Delete(s) => NetworkRequest::DeleteGame {
                token,
                season_id,
                game_id: s.form().game_id.clone(),
            },
            Dialog::Results(s) => {
                let form = s.form();
                match form.validate() {
                    Ok(results) => NetworkRequest::SubmitResults {
                        token,
                        season_id,
                        game_id: form.game_id.clone(),
                        results,
                    },
                    Err(e) => {
                        self.fail_dialog(e.to_string());
                        return None;
                    }
                }
            }
        };

        let dialog = std::mem::take(&mut self.state.dialog);
        self.state.dialog = dialog.into_submitting();
        Some(request)
    }

    fn fail_dialog(&mut self, message: impl Into<String>) {
        let dialog = std::mem::take(&mut self.state.dialog);
        self.state.dialog = dialog.into_failed(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::dialogs::GameField;
    use crate::state::schedule::GamesRequest;
    use chrono::{DateTime, Utc};
    use draco_api::{FilterType, GameStatus, IdName, Team};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn editor_settings() -> AppSettings {
        AppSettings {
            account_id: "7".into(),
            token: Some("tok".into()),
            roles: vec!["AccountAdmin".into()],
            ..Default::default()
        }
    }

    fn game(id: &str, when: &str) -> Game {
        Game {
            id: id.into(),
            game_date: DateTime::parse_from_rfc3339(when).unwrap().with_timezone(&Utc),
            home_team_id: "t1".into(),
            visitor_team_id: "t2".into(),
            league: IdName { id: "ls1".into(), name: "Majors".into() },
            ..Default::default()
        }
    }

    fn leagues() -> Vec<LeagueSeason> {
        vec![LeagueSeason {
            id: "ls1".into(),
            name: "Majors".into(),
            teams: vec![
                Team { id: "t1".into(), name: "Cubs".into() },
                Team { id: "t2".into(), name: "Mets".into() },
            ],
        }]
    }

    /// App with the season loaded and `games` applied for the June window.
    fn loaded_app(settings: AppSettings, games: Vec<Game>) -> App {
        let mut app = App::with_zone(settings, DisplayZone::utc(), ymd(2024, 6, 15));
        let request = app.on_static_loaded(
            Season { id: "s1".into(), name: "2024".into() },
            leagues(),
            vec![],
        );
        let Some(NetworkRequest::LoadGames(GamesRequest { generation, window, .. })) = request else {
            panic!("expected games load");
        };
        app.on_games_loaded(generation, window, games);
        app
    }

    #[test]
    fn static_load_requests_june_month_window() {
        let mut app = App::with_zone(AppSettings::default(), DisplayZone::utc(), ymd(2024, 6, 15));
        assert!(matches!(app.start(), NetworkRequest::LoadStaticData));

        let request = app.on_static_loaded(Season { id: "s1".into(), name: "2024".into() }, vec![], vec![]);
        match request {
            Some(NetworkRequest::LoadGames(r)) => {
                assert_eq!(r.season_id, "s1");
                assert_eq!(r.window.start, ymd(2024, 6, 1));
                assert_eq!(r.window.end, ymd(2024, 6, 30));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn create_without_home_team_never_reaches_network() {
        let mut app = loaded_app(editor_settings(), vec![]);
        app.open_create_dialog();
        if let Dialog::Game(s) = &mut app.state.dialog {
            let form = s.form_mut().unwrap();
            form.visitor_team_id = Some("t2".into());
        }

        assert!(app.submit_dialog().is_none());
        assert_eq!(app.state.dialog.message(), Some("Please fill in all required fields"));
        assert!(!app.state.dialog.is_submitting());
        if let Dialog::Game(s) = &app.state.dialog {
            assert_eq!(s.form().visitor_team_id.as_deref(), Some("t2"), "input kept");
        } else {
            panic!("dialog should stay open");
        }
    }

    #[test]
    fn valid_create_becomes_submitting_request() {
        let mut app = loaded_app(editor_settings(), vec![]);
        app.open_create_dialog();
        if let Dialog::Game(s) = &mut app.state.dialog {
            let form = s.form_mut().unwrap();
            form.home_team_id = Some("t1".into());
            form.visitor_team_id = Some("t2".into());
        }
        match app.submit_dialog() {
            Some(NetworkRequest::CreateGame { token, season_id, draft }) => {
                assert_eq!(token, "tok");
                assert_eq!(season_id, "s1");
                assert_eq!(draft.league_season_id, "ls1");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(app.state.dialog.is_submitting());
        app.close_dialog();
        assert!(app.state.dialog.is_open(), "cannot close while submitting");
    }

    #[test]
    fn unauthorized_delete_closes_dialog_and_keeps_games() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_delete_dialog();
        let request = app.submit_dialog();
        assert!(matches!(request, Some(NetworkRequest::DeleteGame { ref game_id, .. }) if game_id == "g1"));

        let error = ApiError::Unauthorized { url: "x".into(), message: None };
        app.on_mutation_failed(Mutation::Delete { game_id: "g1".into() }, error);

        assert_eq!(app.state.dialog, Dialog::Closed);
        assert_eq!(app.state.last_error(), Some(AUTH_FAILED_MESSAGE));
        assert_eq!(app.state.schedule.games.len(), 1);
    }

    #[test]
    fn failed_update_keeps_dialog_with_server_message() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_edit_dialog();
        assert!(app.submit_dialog().is_some());

        let error = ApiError::Status { status: 409, url: "x".into(), message: Some("Field is booked".into()) };
        app.on_mutation_failed(Mutation::Update { game_id: "g1".into() }, error);
        assert_eq!(app.state.dialog.message(), Some("Field is booked"));
        assert!(!app.state.dialog.is_submitting());
    }

    #[test]
    fn successful_delete_removes_locally_and_reloads() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_delete_dialog();
        app.submit_dialog();

        let request = app.on_mutation_succeeded(Mutation::Delete { game_id: "g1".into() });
        assert!(matches!(request, Some(NetworkRequest::LoadGames(_))));
        assert_eq!(app.state.dialog, Dialog::Closed);
        assert!(app.state.schedule.games.is_empty());
    }

    #[test]
    fn forfeit_tie_is_rejected_before_submit() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_results_dialog();
        if let Dialog::Results(s) = &mut app.state.dialog {
            let form = s.form_mut().unwrap();
            form.status = GameStatus::Forfeit;
            form.home_score = "0".into();
            form.visitor_score = "0".into();
        }
        assert!(app.submit_dialog().is_none());
        assert!(app.state.dialog.message().unwrap().starts_with("For forfeits"));
    }

    #[test]
    fn anonymous_user_cannot_open_dialogs() {
        let mut app = loaded_app(AppSettings::default(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_create_dialog();
        app.open_edit_dialog();
        assert_eq!(app.state.dialog, Dialog::Closed);
        assert_eq!(app.state.last_error(), Some("Log in to manage games"));
    }

    #[test]
    fn logout_revokes_editing() {
        let mut app = loaded_app(editor_settings(), vec![]);
        app.logout();
        app.open_create_dialog();
        assert_eq!(app.state.dialog, Dialog::Closed);
        assert!(!app.state.session.is_authenticated());
    }

    #[test]
    fn failed_games_load_keeps_previous_games() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        let Some(NetworkRequest::LoadGames(r)) = app.refresh() else {
            panic!("expected reload");
        };
        app.on_games_failed(r.generation, "Failed to load games".into());
        assert_eq!(app.state.schedule.games.len(), 1);
        assert_eq!(app.state.last_error(), Some("Failed to load games"));
    }

    #[test]
    fn filter_type_change_mid_flight_ignores_old_answer() {
        let mut app = App::with_zone(AppSettings::default(), DisplayZone::utc(), ymd(2024, 6, 15));
        let Some(NetworkRequest::LoadGames(month)) =
            app.on_static_loaded(Season { id: "s1".into(), name: "2024".into() }, leagues(), vec![])
        else {
            panic!("expected games load");
        };
        let Some(NetworkRequest::LoadGames(week)) = app.set_projection(Projection::Week) else {
            panic!("week switch should refetch");
        };

        app.on_games_loaded(week.generation, week.window, vec![game("w", "2024-06-14T18:00:00Z")]);
        app.on_games_loaded(month.generation, month.window, vec![game("m", "2024-06-02T18:00:00Z")]);

        assert_eq!(app.state.schedule.games[0].id, "w");
        assert_eq!(app.state.schedule.filter_type, FilterType::Week);
        assert_eq!(app.state.schedule.loaded_window, Some(week.window));
    }

    #[test]
    fn season_failure_is_retried_by_refresh() {
        let mut app = App::with_zone(AppSettings::default(), DisplayZone::utc(), ymd(2024, 6, 15));
        app.start();
        app.on_error("Failed to load schedule".into());
        assert_eq!(app.state.last_error(), Some("Failed to load schedule"));

        assert!(matches!(app.on_refresh_tick(), Some(NetworkRequest::LoadStaticData)));
        assert!(matches!(app.refresh(), Some(NetworkRequest::LoadStaticData)));
        assert_eq!(app.state.last_error(), None);

        let request = app.on_static_loaded(Season { id: "s1".into(), name: "2024".into() }, vec![], vec![]);
        assert!(matches!(request, Some(NetworkRequest::LoadGames(_))));
        assert!(matches!(app.refresh(), Some(NetworkRequest::LoadGames(_))));
    }

    #[test]
    fn rapid_navigation_issues_one_fetch() {
        let mut app = loaded_app(editor_settings(), vec![]);
        let now = Instant::now();
        assert!(app.navigate(true, now).is_some());
        assert!(app.navigate(true, now + std::time::Duration::from_millis(20)).is_none());
        assert_eq!(app.state.schedule.anchor, ymd(2024, 7, 15));
    }

    #[test]
    fn game_form_time_rejects_letters() {
        let mut app = loaded_app(editor_settings(), vec![game("g1", "2024-06-15T18:00:00Z")]);
        app.open_edit_dialog();
        app.dialog_next_field();
        app.dialog_input('x');
        if let Dialog::Game(s) = &app.state.dialog {
            assert_eq!(s.form().focus, GameField::Time);
            assert_eq!(s.form().time, "18:00", "letters are not accepted in the time");
        } else {
            panic!("edit dialog expected");
        }
    }
}
