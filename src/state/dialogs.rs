use crate::state::calendar::DisplayZone;
use chrono::{NaiveDate, NaiveTime};
use draco_api::{Field, Game, GameDraft, GameResults, GameStatus, GameType, LeagueSeason, Notifications};
use thiserror::Error;

/// Client-side rejections. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequired,

    #[error("Home and visitor teams must be different")]
    SameTeams,

    #[error("Please enter the date as YYYY-MM-DD and the time as HH:MM")]
    InvalidDateTime,

    #[error("Scores must be whole numbers of 0 or more")]
    InvalidScore,

    #[error(
        "For forfeits, one team must have a score of 0 and the other team must have a score greater than 0"
    )]
    ForfeitScores,
}

// ---------------------------------------------------------------------------
// Dialog state machine
// ---------------------------------------------------------------------------

/// Lifecycle of an open dialog. `Closed` lives one level up in [`Dialog`],
/// so a submitting or failed dialog is always an open one.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogState<F> {
    Open(F),
    Submitting(F),
    Failed { form: F, message: String },
}

impl<F> DialogState<F> {
    pub fn form(&self) -> &F {
        match self {
            DialogState::Open(form) | DialogState::Submitting(form) => form,
            DialogState::Failed { form, .. } => form,
        }
    }

    /// Editable form; `None` while a submit is in flight.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self {
            DialogState::Open(form) => Some(form),
            DialogState::Failed { form, .. } => Some(form),
            DialogState::Submitting(_) => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, DialogState::Submitting(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            DialogState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn into_submitting(self) -> Self {
        match self {
            DialogState::Open(form) | DialogState::Submitting(form) => DialogState::Submitting(form),
            DialogState::Failed { form, .. } => DialogState::Submitting(form),
        }
    }

    /// Keeps the entered data; only the message is added.
    pub fn into_failed(self, message: impl Into<String>) -> Self {
        let form = match self {
            DialogState::Open(form) | DialogState::Submitting(form) => form,
            DialogState::Failed { form, .. } => form,
        };
        DialogState::Failed { form, message: message.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Dialog {
    #[default]
    Closed,
    Game(DialogState<GameForm>),
    Delete(DialogState<DeleteConfirm>),
    Results(DialogState<ResultsForm>),
}

impl Dialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        match self {
            Dialog::Closed => false,
            Dialog::Game(s) => s.is_submitting(),
            Dialog::Delete(s) => s.is_submitting(),
            Dialog::Results(s) => s.is_submitting(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Dialog::Closed => None,
            Dialog::Game(s) => s.message(),
            Dialog::Delete(s) => s.message(),
            Dialog::Results(s) => s.message(),
        }
    }

    pub fn into_submitting(self) -> Self {
        match self {
            Dialog::Closed => Dialog::Closed,
            Dialog::Game(s) => Dialog::Game(s.into_submitting()),
            Dialog::Delete(s) => Dialog::Delete(s.into_submitting()),
            Dialog::Results(s) => Dialog::Results(s.into_submitting()),
        }
    }

    pub fn into_failed(self, message: impl Into<String>) -> Self {
        match self {
            Dialog::Closed => Dialog::Closed,
            Dialog::Game(s) => Dialog::Game(s.into_failed(message)),
            Dialog::Delete(s) => Dialog::Delete(s.into_failed(message)),
            Dialog::Results(s) => Dialog::Results(s.into_failed(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Create / edit game form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameFormMode {
    Create,
    Edit { game_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameField {
    League,
    Date,
    Time,
    Home,
    Visitor,
    Field,
    GameType,
    Comment,
}

impl GameField {
    const ORDER: [GameField; 8] = [
        GameField::League,
        GameField::Date,
        GameField::Time,
        GameField::Home,
        GameField::Visitor,
        GameField::Field,
        GameField::GameType,
        GameField::Comment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GameField::League => "League*",
            GameField::Date => "Date*",
            GameField::Time => "Time",
            GameField::Home => "Home*",
            GameField::Visitor => "Visitor*",
            GameField::Field => "Field",
            GameField::GameType => "Type",
            GameField::Comment => "Comment",
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, GameField::Date | GameField::Time | GameField::Comment)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameForm {
    pub mode: GameFormMode,
    pub league_season_id: Option<String>,
    pub date: String,
    pub time: String,
    pub home_team_id: Option<String>,
    pub visitor_team_id: Option<String>,
    pub field_id: Option<String>,
    pub game_type: GameType,
    pub comment: String,
    pub focus: GameField,
}

impl GameForm {
    /// Empty create form for `date`, preselecting the filtered league.
    pub fn create(date: NaiveDate, league_season_id: Option<String>) -> Self {
        Self {
            mode: GameFormMode::Create,
            league_season_id,
            date: date.format("%Y-%m-%d").to_string(),
            time: "18:00".to_string(),
            home_team_id: None,
            visitor_team_id: None,
            field_id: None,
            game_type: GameType::RegularSeason,
            comment: String::new(),
            focus: GameField::League,
        }
    }

    pub fn edit(game: &Game, zone: &DisplayZone) -> Self {
        let local = zone.naive(game.game_date);
        Self {
            mode: GameFormMode::Edit { game_id: game.id.clone() },
            league_season_id: Some(game.league.id.clone()).filter(|id| !id.is_empty()),
            date: local.format("%Y-%m-%d").to_string(),
            time: local.format("%H:%M").to_string(),
            home_team_id: Some(game.home_team_id.clone()),
            visitor_team_id: Some(game.visitor_team_id.clone()),
            field_id: game.field.as_ref().map(|f| f.id.clone()),
            game_type: game.game_type,
            comment: game.comment.clone(),
            focus: GameField::Date,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, GameFormMode::Edit { .. })
    }

    /// Fields the cursor visits; the league is fixed once a game exists.
    pub fn fields(&self) -> impl Iterator<Item = GameField> + '_ {
        GameField::ORDER
            .into_iter()
            .filter(move |f| !(self.is_edit() && *f == GameField::League))
    }

    pub fn next_field(&mut self) {
        let fields: Vec<GameField> = self.fields().collect();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or_default();
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields: Vec<GameField> = self.fields().collect();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or_default();
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            GameField::Date if c.is_ascii_digit() || c == '-' => self.date.push(c),
            GameField::Time if c.is_ascii_digit() || c == ':' => self.time.push(c),
            GameField::Comment if !c.is_control() => self.comment.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            GameField::Date => drop(self.date.pop()),
            GameField::Time => drop(self.time.pop()),
            GameField::Comment => drop(self.comment.pop()),
            _ => {}
        }
    }

    pub fn focus_is_text(&self) -> bool {
        self.focus.is_text()
    }

    /// Step the focused choice field forwards or backwards.
    pub fn cycle_choice(&mut self, forward: bool, leagues: &[LeagueSeason], fields: &[Field]) {
        match self.focus {
            GameField::League => {
                let ids: Vec<&str> = leagues.iter().map(|l| l.id.as_str()).collect();
                let next = step(&ids, self.league_season_id.as_deref(), forward, false);
                if next != self.league_season_id {
                    self.league_season_id = next;
                    self.home_team_id = None;
                    self.visitor_team_id = None;
                }
            }
            GameField::Home | GameField::Visitor => {
                let teams: Vec<&str> = self
                    .league(leagues)
                    .map(|l| l.teams.iter().map(|t| t.id.as_str()).collect())
                    .unwrap_or_default();
                let slot = if self.focus == GameField::Home {
                    &mut self.home_team_id
                } else {
                    &mut self.visitor_team_id
                };
                *slot = step(&teams, slot.as_deref(), forward, false);
            }
            GameField::Field => {
                let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
                self.field_id = step(&ids, self.field_id.as_deref(), forward, true);
            }
            GameField::GameType => {
                let idx = GameType::ALL.iter().position(|t| *t == self.game_type).unwrap_or_default();
                let len = GameType::ALL.len();
                let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
                self.game_type = GameType::ALL[next];
            }
            GameField::Date | GameField::Time | GameField::Comment => {}
        }
    }

    pub fn league<'a>(&self, leagues: &'a [LeagueSeason]) -> Option<&'a LeagueSeason> {
        let id = self.league_season_id.as_deref()?;
        leagues.iter().find(|l| l.id == id)
    }

    /// Check required fields and build the request payload.
    pub fn validate(&self, zone: &DisplayZone) -> Result<GameDraft, ValidationError> {
        let required = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(str::to_owned);

        let league = required(&self.league_season_id);
        let home = required(&self.home_team_id);
        let visitor = required(&self.visitor_team_id);
        let (Some(league), Some(home), Some(visitor)) = (league, home, visitor) else {
            return Err(ValidationError::MissingRequired);
        };
        if self.date.trim().is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        if home == visitor {
            return Err(ValidationError::SameTeams);
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDateTime)?;
        let time = if self.time.trim().is_empty() {
            NaiveTime::MIN
        } else {
            NaiveTime::parse_from_str(self.time.trim(), "%H:%M").map_err(|_| ValidationError::InvalidDateTime)?
        };
        let game_date = zone
            .to_utc(date.and_time(time))
            .ok_or(ValidationError::InvalidDateTime)?;

        Ok(GameDraft {
            league_season_id: league,
            game_date,
            home_team_id: home,
            visitor_team_id: visitor,
            field_id: self.field_id.clone().filter(|f| !f.is_empty()),
            comment: self.comment.trim().to_owned(),
            game_type: self.game_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Delete confirmation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirm {
    pub game_id: String,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Enter results form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsField {
    VisitorScore,
    HomeScore,
    Status,
    EmailPlayers,
    PostToTwitter,
    PostToBluesky,
    PostToFacebook,
}

impl ResultsField {
    pub const ORDER: [ResultsField; 7] = [
        ResultsField::VisitorScore,
        ResultsField::HomeScore,
        ResultsField::Status,
        ResultsField::EmailPlayers,
        ResultsField::PostToTwitter,
        ResultsField::PostToBluesky,
        ResultsField::PostToFacebook,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResultsField::VisitorScore => "Visitor score",
            ResultsField::HomeScore => "Home score",
            ResultsField::Status => "Status",
            ResultsField::EmailPlayers => "Email players",
            ResultsField::PostToTwitter => "Post to Twitter",
            ResultsField::PostToBluesky => "Post to Bluesky",
            ResultsField::PostToFacebook => "Post to Facebook",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsForm {
    pub game_id: String,
    pub matchup: String,
    pub home_score: String,
    pub visitor_score: String,
    pub status: GameStatus,
    pub notify: Notifications,
    pub focus: ResultsField,
}

impl ResultsForm {
    /// Seeded from the game; a still-scheduled game proposes `Completed`.
    pub fn for_game(game: &Game, matchup: String) -> Self {
        let status = match game.status {
            GameStatus::Scheduled => GameStatus::Completed,
            other => other,
        };
        Self {
            game_id: game.id.clone(),
            matchup,
            home_score: game.home_score.unwrap_or_default().to_string(),
            visitor_score: game.visitor_score.unwrap_or_default().to_string(),
            status,
            notify: Notifications::default(),
            focus: ResultsField::VisitorScore,
        }
    }

    pub fn next_field(&mut self) {
        let idx = ResultsField::ORDER.iter().position(|f| *f == self.focus).unwrap_or_default();
        self.focus = ResultsField::ORDER[(idx + 1) % ResultsField::ORDER.len()];
    }

    pub fn prev_field(&mut self) {
        let len = ResultsField::ORDER.len();
        let idx = ResultsField::ORDER.iter().position(|f| *f == self.focus).unwrap_or_default();
        self.focus = ResultsField::ORDER[(idx + len - 1) % len];
    }

    pub fn input_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            if c == ' ' {
                self.toggle();
            }
            return;
        }
        match self.focus {
            ResultsField::HomeScore => self.home_score.push(c),
            ResultsField::VisitorScore => self.visitor_score.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            ResultsField::HomeScore => drop(self.home_score.pop()),
            ResultsField::VisitorScore => drop(self.visitor_score.pop()),
            _ => {}
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if self.focus != ResultsField::Status {
            self.toggle();
            return;
        }
        let len = GameStatus::ALL.len();
        let idx = GameStatus::ALL.iter().position(|s| *s == self.status).unwrap_or_default();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.status = GameStatus::ALL[next];
    }

    fn toggle(&mut self) {
        let flag = match self.focus {
            ResultsField::EmailPlayers => &mut self.notify.email_players,
            ResultsField::PostToTwitter => &mut self.notify.post_to_twitter,
            ResultsField::PostToBluesky => &mut self.notify.post_to_bluesky,
            ResultsField::PostToFacebook => &mut self.notify.post_to_facebook,
            _ => return,
        };
        *flag = !*flag;
    }

    pub fn flag(&self, field: ResultsField) -> Option<bool> {
        match field {
            ResultsField::EmailPlayers => Some(self.notify.email_players),
            ResultsField::PostToTwitter => Some(self.notify.post_to_twitter),
            ResultsField::PostToBluesky => Some(self.notify.post_to_bluesky),
            ResultsField::PostToFacebook => Some(self.notify.post_to_facebook),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<GameResults, ValidationError> {
        let parse = |s: &str| s.trim().parse::<u16>().map_err(|_| ValidationError::InvalidScore);
        let home_score = parse(&self.home_score)?;
        let visitor_score = parse(&self.visitor_score)?;
        if self.status == GameStatus::Forfeit {
            validate_forfeit(home_score, visitor_score)?;
        }
        Ok(GameResults { home_score, visitor_score, status: self.status, notify: self.notify })
    }
}

/// A forfeit has exactly one zero score and one positive score.
pub fn validate_forfeit(home_score: u16, visitor_score: u16) -> Result<(), ValidationError> {
    match (home_score, visitor_score) {
        (0, v) if v > 0 => Ok(()),
        (h, 0) if h > 0 => Ok(()),
        _ => Err(ValidationError::ForfeitScores),
    }
}

/// Next/previous id in `ids` after `current`. With `allow_none` the cycle
/// passes through "nothing selected" between the last and the first entry.
fn step(ids: &[&str], current: Option<&str>, forward: bool, allow_none: bool) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let len = ids.len();
    let pos = current.and_then(|c| ids.iter().position(|id| *id == c));
    let next = match (pos, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) if i + 1 == len => (!allow_none).then_some(0),
        (Some(i), true) => Some(i + 1),
        (Some(0), false) => (!allow_none).then_some(len - 1),
        (Some(i), false) => Some(i - 1),
    };
    next.map(|i| ids[i].to_owned())
}
