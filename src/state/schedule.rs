use crate::state::calendar::{DisplayZone, Projection, games_on};
use crate::state::filter::{FilterSelection, filter_games, find_team};
use chrono::NaiveDate;
use draco_api::window::{self, FilterType, ViewWindow, compute_window};
use draco_api::{Field, Game, LeagueSeason, Season};
use std::time::{Duration, Instant};

/// Prev/next presses closer together than this collapse into one.
pub const NAVIGATION_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Drops period navigation that arrives within [`NAVIGATION_DEBOUNCE`] of
/// the last accepted one.
#[derive(Debug, Default)]
pub struct NavigationGuard {
    last_accepted: Option<Instant>,
}

impl NavigationGuard {
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted
            && now.saturating_duration_since(last) < NAVIGATION_DEBOUNCE
        {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }
}

/// One games fetch, tagged so a late answer for an old window can be told
/// apart from the answer for the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamesRequest {
    pub season_id: String,
    pub window: ViewWindow,
    pub generation: u64,
}

/// Everything the schedule screen shows: reference data, the cached games
/// for one season and one window, and the view selection over them.
#[derive(Debug)]
pub struct ScheduleState {
    pub season: Option<Season>,
    pub leagues: Vec<LeagueSeason>,
    pub fields: Vec<Field>,
    pub games: Vec<Game>,
    /// Window the cached games belong to.
    pub loaded_window: Option<ViewWindow>,
    pub projection: Projection,
    pub filter_type: FilterType,
    pub anchor: NaiveDate,
    pub filter: FilterSelection,
    /// Index into [`ScheduleState::focus_games`].
    pub selected_game: usize,
    pub zone: DisplayZone,
    latest_request: Option<(u64, ViewWindow)>,
    generation: u64,
    nav_guard: NavigationGuard,
}

impl ScheduleState {
    pub fn new(today: NaiveDate, zone: DisplayZone) -> Self {
        Self {
            season: None,
            leagues: Vec::new(),
            fields: Vec::new(),
            games: Vec::new(),
            loaded_window: None,
            projection: Projection::Month,
            filter_type: FilterType::Month,
            anchor: today,
            filter: FilterSelection::default(),
            selected_game: 0,
            zone,
            latest_request: None,
            generation: 0,
            nav_guard: NavigationGuard::default(),
        }
    }

    pub fn window(&self) -> ViewWindow {
        compute_window(self.filter_type, self.anchor)
    }

    // -----------------------------------------------------------------------
    // Fetch/cache
    // -----------------------------------------------------------------------

    pub fn apply_static(&mut self, season: Season, leagues: Vec<LeagueSeason>, fields: Vec<Field>) {
        if self.season.as_ref().is_some_and(|s| s.id != season.id) {
            self.games.clear();
            self.loaded_window = None;
            self.latest_request = None;
        }
        self.season = Some(season);
        self.leagues = leagues;
        self.fields = fields;
        self.filter.retain_known(&self.leagues);
    }

    /// Issue a fetch for the current window. `None` until the season is known.
    pub fn request_games(&mut self) -> Option<GamesRequest> {
        let season_id = self.season.as_ref()?.id.clone();
        self.generation += 1;
        let window = self.window();
        self.latest_request = Some((self.generation, window));
        Some(GamesRequest { season_id, window, generation: self.generation })
    }

    /// True when the window on screen is not the one last requested.
    pub fn needs_fetch(&self) -> bool {
        match self.latest_request {
            Some((_, requested)) => !requested.same_range(&self.window()),
            None => true,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest_request.is_some_and(|(latest, _)| latest == generation)
    }

    /// Replace the cached games wholesale, keeping only games whose local day
    /// falls inside `window`. Answers to superseded requests are dropped and
    /// `false` is returned.
    pub fn apply_games(&mut self, generation: u64, window: ViewWindow, mut games: Vec<Game>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let zone = self.zone;
        games.retain(|g| window.contains(zone.date_of(g.game_date)));
        self.games = games;
        self.loaded_window = Some(window);
        self.clamp_selection();
        true
    }

    pub fn remove_game(&mut self, game_id: &str) -> bool {
        let before = self.games.len();
        self.games.retain(|g| g.id != game_id);
        self.clamp_selection();
        self.games.len() != before
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub fn filtered_games(&self) -> Vec<&Game> {
        filter_games(&self.games, &self.filter)
    }

    /// Games the cursor can select: the anchor day's games in the calendar
    /// projections, every filtered game in the list.
    pub fn focus_games(&self) -> Vec<&Game> {
        let filtered = self.filtered_games();
        match self.projection {
            Projection::List => {
                let mut all = filtered;
                all.sort_by_key(|g| g.game_date);
                all
            }
            Projection::Year => Vec::new(),
            Projection::Day | Projection::Week | Projection::Month => {
                games_on(&filtered, self.anchor, &self.zone)
            }
        }
    }

    pub fn selected(&self) -> Option<&Game> {
        self.focus_games().get(self.selected_game).copied()
    }

    pub fn select_next(&mut self) {
        let max = self.focus_games().len().saturating_sub(1);
        if self.selected_game < max {
            self.selected_game += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_game = self.selected_game.saturating_sub(1);
    }

    pub fn team_name(&self, team_id: &str) -> String {
        find_team(&self.leagues, team_id)
            .map(|t| t.name.clone())
            .or_else(|| {
                self.games.iter().find_map(|g| {
                    if g.home_team_id == team_id {
                        g.home_team_name.clone()
                    } else if g.visitor_team_id == team_id {
                        g.visitor_team_name.clone()
                    } else {
                        None
                    }
                })
            })
            .unwrap_or_else(|| "TBD".to_string())
    }

    /// "Visitor @ Home".
    pub fn matchup(&self, game: &Game) -> String {
        format!("{} @ {}", self.team_name(&game.visitor_team_id), self.team_name(&game.home_team_id))
    }

    pub fn field_label(&self, game: &Game) -> Option<String> {
        let field = game.field.as_ref()?;
        let known = self.fields.iter().find(|f| f.id == field.id);
        Some(match known {
            Some(f) => f.label().to_string(),
            None if !field.short_name.is_empty() => field.short_name.clone(),
            None => field.name.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Switch projection. Calendar projections also set the window kind.
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        if let Some(filter_type) = projection.filter_type() {
            self.filter_type = filter_type;
        }
        self.selected_game = 0;
    }

    /// Previous/next period. Returns whether the press was accepted.
    pub fn navigate(&mut self, forward: bool, now: Instant) -> bool {
        if !self.nav_guard.try_acquire(now) {
            return false;
        }
        let steps = if forward { 1 } else { -1 };
        self.set_anchor(window::shift(self.filter_type, self.anchor, steps));
        true
    }

    /// Arrow-key cursor movement; the meaning depends on the projection.
    pub fn move_cursor(&mut self, direction: Direction) {
        use Direction::*;
        match (self.projection, direction) {
            (Projection::Day | Projection::List, Up) => self.select_prev(),
            (Projection::Day | Projection::List, Down) => self.select_next(),
            (Projection::Day, Left) => self.shift_days(-1),
            (Projection::Day, Right) => self.shift_days(1),
            (Projection::List, Left | Right) => {}
            (Projection::Week, Left) => self.shift_days(-1),
            (Projection::Week, Right) => self.shift_days(1),
            (Projection::Week, Up) => self.select_prev(),
            (Projection::Week, Down) => self.select_next(),
            (Projection::Month, Left) => self.shift_days(-1),
            (Projection::Month, Right) => self.shift_days(1),
            (Projection::Month, Up) => self.shift_days(-7),
            (Projection::Month, Down) => self.shift_days(7),
            (Projection::Year, Left) => self.shift_months(-1),
            (Projection::Year, Right) => self.shift_months(1),
            (Projection::Year, Up) => self.shift_months(-4),
            (Projection::Year, Down) => self.shift_months(4),
        }
    }

    /// Drill from the cell under the cursor into the next finer projection.
    pub fn drill_in(&mut self) -> bool {
        match self.projection.drill_in() {
            Some(next) => {
                self.set_projection(next);
                true
            }
            None => false,
        }
    }

    /// Back to today, keeping the projection.
    pub fn go_today(&mut self, today: NaiveDate) {
        self.set_anchor(today);
    }

    fn shift_days(&mut self, days: i32) {
        self.set_anchor(window::shift(FilterType::Day, self.anchor, days));
    }

    fn shift_months(&mut self, months: i32) {
        self.set_anchor(window::shift(FilterType::Month, self.anchor, months));
    }

    fn set_anchor(&mut self, anchor: NaiveDate) {
        if anchor != self.anchor {
            self.anchor = anchor;
            self.selected_game = 0;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.focus_games().len();
        if self.selected_game >= len {
            self.selected_game = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use draco_api::{IdName, Team};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn game_at(id: &str, rfc3339: &str) -> Game {
        Game {
            id: id.into(),
            game_date: DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc),
            home_team_id: "t1".into(),
            visitor_team_id: "t2".into(),
            league: IdName { id: "ls1".into(), name: "Majors".into() },
            ..Default::default()
        }
    }

    fn loaded_state() -> ScheduleState {
        let mut state = ScheduleState::new(ymd(2024, 6, 15), DisplayZone::utc());
        state.apply_static(
            Season { id: "s1".into(), name: "2024".into() },
            vec![LeagueSeason {
                id: "ls1".into(),
                name: "Majors".into(),
                teams: vec![
                    Team { id: "t1".into(), name: "Cubs".into() },
                    Team { id: "t2".into(), name: "Mets".into() },
                ],
            }],
            vec![],
        );
        state
    }

    #[test]
    fn no_games_request_before_season_is_known() {
        let mut state = ScheduleState::new(ymd(2024, 6, 15), DisplayZone::utc());
        assert!(state.request_games().is_none());
    }

    #[test]
    fn month_load_requests_june_window() {
        let mut state = loaded_state();
        let request = state.request_games().unwrap();
        assert_eq!(request.season_id, "s1");
        assert_eq!(request.window.start, ymd(2024, 6, 1));
        assert_eq!(request.window.end, ymd(2024, 6, 30));

        let games = vec![game_at("g1", "2024-06-15T18:00:00Z")];
        assert!(state.apply_games(request.generation, request.window, games));
        assert_eq!(state.selected().map(|g| g.id.as_str()), Some("g1"));
    }

    #[test]
    fn day_window_drops_games_from_the_padded_edges() {
        let mut state = loaded_state();
        state.set_projection(Projection::Day);
        state.set_projection(Projection::List);
        let request = state.request_games().unwrap();
        assert_eq!(request.window.end_param(), "2024-06-16");

        let games = vec![
            game_at("before", "2024-06-14T18:00:00Z"),
            game_at("today", "2024-06-15T18:00:00Z"),
            game_at("tomorrow", "2024-06-16T18:00:00Z"),
        ];
        assert!(state.apply_games(request.generation, request.window, games));

        let ids: Vec<_> = state.focus_games().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[test]
    fn month_window_keeps_late_local_games_across_utc_midnight() {
        let offset = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let mut state = ScheduleState::new(ymd(2024, 6, 15), DisplayZone::Fixed(offset));
        state.apply_static(Season { id: "s1".into(), name: "2024".into() }, vec![], vec![]);
        let request = state.request_games().unwrap();
        assert_eq!(request.window.end_param(), "2024-07-01");

        // 20:00 on June 30 at UTC-5 and 20:00 on July 1 at UTC-5.
        let games = vec![
            game_at("june30", "2024-07-01T01:00:00Z"),
            game_at("july1", "2024-07-02T01:00:00Z"),
        ];
        assert!(state.apply_games(request.generation, request.window, games));

        let ids: Vec<_> = state.games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["june30"]);
    }

    #[test]
    fn stale_response_is_discarded_after_filter_type_change() {
        let mut state = loaded_state();
        let month = state.request_games().unwrap();

        // Switch to week before the month answer arrives.
        state.set_projection(Projection::Week);
        assert!(state.needs_fetch());
        let week = state.request_games().unwrap();

        let week_games = vec![game_at("w", "2024-06-14T18:00:00Z")];
        assert!(state.apply_games(week.generation, week.window, week_games));

        let month_games = vec![game_at("m1", "2024-06-02T18:00:00Z"), game_at("m2", "2024-06-28T18:00:00Z")];
        assert!(!state.apply_games(month.generation, month.window, month_games));

        assert_eq!(state.games.len(), 1);
        assert_eq!(state.games[0].id, "w");
        assert_eq!(state.loaded_window, Some(week.window));
        assert_eq!(state.filter_type, FilterType::Week);
    }

    #[test]
    fn cursor_inside_window_does_not_refetch() {
        let mut state = loaded_state();
        state.request_games();
        state.move_cursor(Direction::Right);
        assert_eq!(state.anchor, ymd(2024, 6, 16));
        assert!(!state.needs_fetch());

        state.move_cursor(Direction::Down);
        state.move_cursor(Direction::Down);
        assert_eq!(state.anchor, ymd(2024, 6, 30));
        state.move_cursor(Direction::Right);
        assert_eq!(state.anchor, ymd(2024, 7, 1));
        assert!(state.needs_fetch());
    }

    #[test]
    fn navigation_debounce_coalesces_rapid_presses() {
        let mut state = loaded_state();
        state.set_projection(Projection::Week);
        let t0 = Instant::now();

        assert!(state.navigate(true, t0));
        assert!(!state.navigate(true, t0 + Duration::from_millis(40)));
        assert!(!state.navigate(false, t0 + Duration::from_millis(99)));
        assert_eq!(state.anchor, ymd(2024, 6, 22));

        assert!(state.navigate(true, t0 + Duration::from_millis(150)));
        assert_eq!(state.anchor, ymd(2024, 6, 29));
    }

    #[test]
    fn navigation_moves_by_current_filter_type() {
        let mut state = loaded_state();
        let t0 = Instant::now();
        assert!(state.navigate(false, t0));
        assert_eq!(state.anchor, ymd(2024, 5, 15));

        state.set_projection(Projection::Year);
        assert!(state.navigate(true, t0 + Duration::from_secs(1)));
        assert_eq!(state.anchor, ymd(2025, 5, 15));
    }

    #[test]
    fn list_projection_keeps_filter_type() {
        let mut state = loaded_state();
        state.set_projection(Projection::Week);
        state.set_projection(Projection::List);
        assert_eq!(state.filter_type, FilterType::Week);
    }

    #[test]
    fn drill_in_from_year_lands_on_month() {
        let mut state = loaded_state();
        state.set_projection(Projection::Year);
        state.move_cursor(Direction::Down);
        assert_eq!(state.anchor, ymd(2024, 10, 15));
        assert!(state.drill_in());
        assert_eq!(state.projection, Projection::Month);
        assert_eq!(state.filter_type, FilterType::Month);
        assert!(state.drill_in());
        assert_eq!(state.projection, Projection::Day);
        assert!(!state.drill_in());
    }

    #[test]
    fn today_preserves_projection() {
        let mut state = loaded_state();
        state.set_projection(Projection::Week);
        state.go_today(ymd(2025, 1, 2));
        assert_eq!(state.projection, Projection::Week);
        assert_eq!(state.anchor, ymd(2025, 1, 2));
    }

    #[test]
    fn removing_game_clamps_selection() {
        let mut state = loaded_state();
        let request = state.request_games().unwrap();
        let games = vec![game_at("a", "2024-06-15T17:00:00Z"), game_at("b", "2024-06-15T19:00:00Z")];
        state.apply_games(request.generation, request.window, games);
        state.select_next();
        assert_eq!(state.selected().map(|g| g.id.as_str()), Some("b"));

        assert!(state.remove_game("b"));
        assert_eq!(state.selected().map(|g| g.id.as_str()), Some("a"));
        assert!(!state.remove_game("b"));
    }

    #[test]
    fn team_names_come_from_leagues_then_games() {
        let mut state = loaded_state();
        let mut game = game_at("g", "2024-06-15T17:00:00Z");
        game.visitor_team_id = "t9".into();
        game.visitor_team_name = Some("Visitors".into());
        state.games.push(game.clone());
        assert_eq!(state.matchup(&game), "Visitors @ Cubs");
        assert_eq!(state.team_name("nobody"), "TBD");
    }

    #[test]
    fn new_season_drops_cached_games() {
        let mut state = loaded_state();
        let request = state.request_games().unwrap();
        state.apply_games(request.generation, request.window, vec![game_at("g", "2024-06-15T17:00:00Z")]);
        state.apply_static(Season { id: "s2".into(), name: "2025".into() }, vec![], vec![]);
        assert!(state.games.is_empty());
        assert!(state.needs_fetch());
        assert!(!state.is_current(request.generation));
    }
}
