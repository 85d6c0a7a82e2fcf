pub mod client;
pub mod window;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::{ApiError, ApiResult, DracoApi};
pub use window::{FilterType, ViewWindow, compute_window};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the Draco wire format
// ---------------------------------------------------------------------------

/// An `{id, name}` pair as the backend returns for leagues and seasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdName {
    pub id: String,
    pub name: String,
}

/// The account's current season. Every game request is scoped to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Season {
    pub id: String,
    pub name: String,
}

/// A league instance within a season, flattened with all of its teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueSeason {
    pub id: String,
    pub name: String,
    pub teams: Vec<Team>,
}

impl LeagueSeason {
    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}

/// A team season. The id is the team-season id games refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Field {
    /// Short name when the backend has one, full name otherwise.
    pub fn label(&self) -> &str {
        if self.short_name.is_empty() { &self.name } else { &self.short_name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRef {
    pub id: String,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    pub id: String,
    pub game_date: DateTime<Utc>,
    pub home_team_id: String,
    pub visitor_team_id: String,
    pub home_team_name: Option<String>,
    pub visitor_team_name: Option<String>,
    pub home_score: Option<u16>,
    pub visitor_score: Option<u16>,
    pub status: GameStatus,
    pub game_type: GameType,
    pub field: Option<FieldRef>,
    pub league: IdName,
    pub season: IdName,
    pub comment: String,
    pub umpire_ids: Vec<String>,
}

impl Game {
    pub fn involves_team(&self, team_id: &str) -> bool {
        self.home_team_id == team_id || self.visitor_team_id == team_id
    }

    /// (visitor, home) once both scores are known.
    pub fn score(&self) -> Option<(u16, u16)> {
        self.visitor_score.zip(self.home_score)
    }
}

/// Outcome state of a game. The discriminant is the backend's wire code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameStatus {
    #[default]
    Scheduled = 0,
    Completed = 1,
    Rainout = 2,
    Postponed = 3,
    Forfeit = 4,
    DidNotReport = 5,
}

impl GameStatus {
    pub const ALL: [GameStatus; 6] = [
        GameStatus::Scheduled,
        GameStatus::Completed,
        GameStatus::Rainout,
        GameStatus::Postponed,
        GameStatus::Forfeit,
        GameStatus::DidNotReport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "Scheduled",
            GameStatus::Completed => "Final",
            GameStatus::Rainout => "Rainout",
            GameStatus::Postponed => "Postponed",
            GameStatus::Forfeit => "Forfeit",
            GameStatus::DidNotReport => "Did Not Report",
        }
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "SCH",
            GameStatus::Completed => "FNL",
            GameStatus::Rainout => "RN",
            GameStatus::Postponed => "PPD",
            GameStatus::Forfeit => "FFT",
            GameStatus::DidNotReport => "DNR",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for GameStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        GameStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| format!("unknown game status code {code}"))
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> u8 {
        status.code()
    }
}

/// Kind of game. The discriminant is the backend's wire code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameType {
    #[default]
    RegularSeason = 0,
    Playoff = 1,
    Exhibition = 2,
}

impl GameType {
    pub const ALL: [GameType; 3] = [GameType::RegularSeason, GameType::Playoff, GameType::Exhibition];

    pub fn label(&self) -> &'static str {
        match self {
            GameType::RegularSeason => "Regular Season",
            GameType::Playoff => "Playoff",
            GameType::Exhibition => "Exhibition",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for GameType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        GameType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| format!("unknown game type code {code}"))
    }
}

impl From<GameType> for u8 {
    fn from(game_type: GameType) -> u8 {
        game_type.code()
    }
}

// ---------------------------------------------------------------------------
// Mutation payloads
// ---------------------------------------------------------------------------

/// Fields shared by the create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameDraft {
    pub league_season_id: String,
    pub game_date: DateTime<Utc>,
    pub home_team_id: String,
    pub visitor_team_id: String,
    pub field_id: Option<String>,
    pub comment: String,
    pub game_type: GameType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameResults {
    pub home_score: u16,
    pub visitor_score: u16,
    pub status: GameStatus,
    pub notify: Notifications,
}

/// Where the backend should announce a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    pub email_players: bool,
    pub post_to_twitter: bool,
    pub post_to_bluesky: bool,
    pub post_to_facebook: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_backend_order() {
        assert_eq!(GameStatus::try_from(4), Ok(GameStatus::Forfeit));
        assert_eq!(u8::from(GameStatus::DidNotReport), 5);
        assert!(GameStatus::try_from(9).is_err());
    }

    #[test]
    fn game_type_codes_round_out_at_exhibition() {
        assert_eq!(GameType::try_from(2), Ok(GameType::Exhibition));
        assert!(GameType::try_from(3).is_err());
    }

    #[test]
    fn involves_team_checks_both_sides() {
        let game = Game {
            home_team_id: "h".into(),
            visitor_team_id: "v".into(),
            ..Default::default()
        };
        assert!(game.involves_team("h"));
        assert!(game.involves_team("v"));
        assert!(!game.involves_team("x"));
    }

    #[test]
    fn field_label_prefers_short_name() {
        let mut field = Field { name: "Memorial Park".into(), ..Default::default() };
        assert_eq!(field.label(), "Memorial Park");
        field.short_name = "MP".into();
        assert_eq!(field.label(), "MP");
    }
}
