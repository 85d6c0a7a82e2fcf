//! Wire types for the Draco REST API.
//! Endpoint root: {base}/api/accounts/{accountId}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GameStatus, GameType, IdName};

#[derive(Deserialize, Default, Debug)]
pub struct SeasonResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSeasonResponse {
    /// League-season id; this is what games and filters refer to.
    pub id: String,
    pub league: IdName,
    #[serde(default)]
    pub divisions: Vec<DivisionResponse>,
    #[serde(default)]
    pub unassigned_teams: Vec<TeamResponse>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DivisionResponse {
    #[serde(default)]
    pub teams: Vec<TeamResponse>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FieldResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub game_date: DateTime<Utc>,
    pub home_team_id: String,
    pub visitor_team_id: String,
    pub home_team_name: Option<String>,
    pub visitor_team_name: Option<String>,
    pub home_score: Option<u16>,
    pub visitor_score: Option<u16>,
    #[serde(default)]
    pub game_status: GameStatus,
    #[serde(default)]
    pub game_type: GameType,
    pub field: Option<FieldRefResponse>,
    #[serde(default)]
    pub league: IdName,
    #[serde(default)]
    pub season: IdName,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub umpire1: Option<String>,
    #[serde(default)]
    pub umpire2: Option<String>,
    #[serde(default)]
    pub umpire3: Option<String>,
    #[serde(default)]
    pub umpire4: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FieldRefResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
}

/// Error body shape shared by every endpoint.
#[derive(Deserialize, Default, Debug)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest<'a> {
    pub league_season_id: &'a str,
    pub game_date: String,
    pub home_team_id: &'a str,
    pub visitor_team_id: &'a str,
    pub field_id: Option<&'a str>,
    pub comment: &'a str,
    pub game_type: GameType,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest<'a> {
    pub game_date: String,
    pub home_team_id: &'a str,
    pub visitor_team_id: &'a str,
    pub field_id: Option<&'a str>,
    pub comment: &'a str,
    pub game_type: GameType,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GameResultsRequest {
    pub home_score: u16,
    pub visitor_score: u16,
    pub game_status: GameStatus,
    pub email_players: bool,
    pub post_to_twitter: bool,
    pub post_to_bluesky: bool,
    pub post_to_facebook: bool,
}
