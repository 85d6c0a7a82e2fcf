use crate::window::ViewWindow;
use crate::wire::{
    CreateGameRequest, ErrorBody, FieldResponse, GameResponse, GameResultsRequest,
    LeagueSeasonResponse, SeasonResponse, TeamResponse, UpdateGameRequest,
};
use crate::{Field, FieldRef, Game, GameDraft, GameResults, LeagueSeason, Season, Team};
use chrono::SecondsFormat;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Draco REST client scoped to one account.
#[derive(Debug, Clone)]
pub struct DracoApi {
    client: Client,
    base_url: String,
    account_id: String,
    timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error for {1}")]
    Network(#[source] reqwest::Error, String),

    #[error("not authorized for {url}")]
    Unauthorized { url: String, message: Option<String> },

    #[error("API error {status} for {url}")]
    Status { status: u16, url: String, message: Option<String> },

    #[error("parse error for {1}")]
    Parsing(#[source] reqwest::Error, String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Message suitable for the UI: the server's `{message}` when it sent one,
    /// otherwise the call site's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { message: Some(m), .. }
            | ApiError::Status { message: Some(m), .. } => m.clone(),
            _ => fallback.to_owned(),
        }
    }
}

impl DracoApi {
    pub fn new(base_url: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("draco-schedule/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            account_id: account_id.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub async fn fetch_current_season(&self) -> ApiResult<Season> {
        let url = self.account_url("/seasons/current");
        let raw: SeasonResponse = self.get(&url).await?;
        Ok(Season { id: raw.id, name: raw.name })
    }

    /// Leagues of a season with every team flattened out of its divisions.
    pub async fn fetch_leagues(&self, season_id: &str) -> ApiResult<Vec<LeagueSeason>> {
        let url = self.account_url(&format!("/seasons/{season_id}/leagues?includeTeams=true"));
        let raw: Vec<LeagueSeasonResponse> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_league_season).collect())
    }

    pub async fn fetch_fields(&self) -> ApiResult<Vec<Field>> {
        let url = self.account_url("/fields");
        let raw: Vec<FieldResponse> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_field).collect())
    }

    /// Games of a season inside `window`, ordered by date.
    pub async fn fetch_games(&self, season_id: &str, window: &ViewWindow) -> ApiResult<Vec<Game>> {
        let url = self.account_url(&format!(
            "/seasons/{season_id}/games?startDate={}&endDate={}",
            window.start_param(),
            window.end_param()
        ));
        let raw: Vec<GameResponse> = self.get(&url).await?;
        let mut games: Vec<Game> = raw.into_iter().map(map_game).collect();
        games.sort_by(|a, b| a.game_date.cmp(&b.game_date).then_with(|| a.id.cmp(&b.id)));
        Ok(games)
    }

    pub async fn create_game(&self, token: &str, season_id: &str, draft: &GameDraft) -> ApiResult<()> {
        let url = self.account_url(&format!("/seasons/{season_id}/games"));
        let body = CreateGameRequest {
            league_season_id: &draft.league_season_id,
            game_date: draft.game_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            home_team_id: &draft.home_team_id,
            visitor_team_id: &draft.visitor_team_id,
            field_id: draft.field_id.as_deref(),
            comment: &draft.comment,
            game_type: draft.game_type,
        };
        debug!("creating game {} vs {}", draft.visitor_team_id, draft.home_team_id);
        let request = self.client.post(&url).bearer_auth(token).json(&body);
        self.send(request, &url).await.map(drop)
    }

    pub async fn update_game(
        &self,
        token: &str,
        season_id: &str,
        game_id: &str,
        draft: &GameDraft,
    ) -> ApiResult<()> {
        let url = self.account_url(&format!("/seasons/{season_id}/games/{game_id}"));
        let body = UpdateGameRequest {
            game_date: draft.game_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            home_team_id: &draft.home_team_id,
            visitor_team_id: &draft.visitor_team_id,
            field_id: draft.field_id.as_deref(),
            comment: &draft.comment,
            game_type: draft.game_type,
        };
        debug!("updating game {game_id}");
        let request = self.client.put(&url).bearer_auth(token).json(&body);
        self.send(request, &url).await.map(drop)
    }

    pub async fn delete_game(&self, token: &str, season_id: &str, game_id: &str) -> ApiResult<()> {
        let url = self.account_url(&format!("/seasons/{season_id}/games/{game_id}"));
        debug!("deleting game {game_id}");
        let request = self.client.delete(&url).bearer_auth(token);
        self.send(request, &url).await.map(drop)
    }

    pub async fn submit_results(
        &self,
        token: &str,
        season_id: &str,
        game_id: &str,
        results: &GameResults,
    ) -> ApiResult<()> {
        let url = self.account_url(&format!("/seasons/{season_id}/games/{game_id}/results"));
        let body = GameResultsRequest {
            home_score: results.home_score,
            visitor_score: results.visitor_score,
            game_status: results.status,
            email_players: results.notify.email_players,
            post_to_twitter: results.notify.post_to_twitter,
            post_to_bluesky: results.notify.post_to_bluesky,
            post_to_facebook: results.notify.post_to_facebook,
        };
        debug!("submitting results for game {game_id}");
        let request = self.client.put(&url).bearer_auth(token).json(&body);
        self.send(request, &url).await.map(drop)
    }

    fn account_url(&self, path: &str) -> String {
        format!("{}/api/accounts/{}{path}", self.base_url, self.account_id)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let request = self.client.get(url);
        self.send(request, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are `{message}` when the server sends one at all.
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized { url: url.to_owned(), message })
        } else {
            Err(ApiError::Status { status: status.as_u16(), url: url.to_owned(), message })
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: Draco wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_league_season(raw: LeagueSeasonResponse) -> LeagueSeason {
    let mut teams = raw
        .divisions
        .into_iter()
        .flat_map(|d| d.teams)
        .chain(raw.unassigned_teams)
        .map(map_team)
        .fold(Vec::<Team>::new(), |mut acc, team| {
            if !acc.iter().any(|t| t.id == team.id) {
                acc.push(team);
            }
            acc
        });
    teams.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    LeagueSeason { id: raw.id, name: raw.league.name, teams }
}

fn map_team(raw: TeamResponse) -> Team {
    Team { id: raw.id, name: raw.name }
}

fn map_field(raw: FieldResponse) -> Field {
    Field {
        id: raw.id,
        name: raw.name,
        short_name: raw.short_name,
        address: raw.address.unwrap_or_default(),
        city: raw.city.unwrap_or_default(),
        state: raw.state.unwrap_or_default(),
        zip: raw.zip.unwrap_or_default(),
    }
}

fn map_game(raw: GameResponse) -> Game {
    let umpire_ids = [raw.umpire1, raw.umpire2, raw.umpire3, raw.umpire4]
        .into_iter()
        .flatten()
        .filter(|u| !u.is_empty())
        .collect();

    Game {
        id: raw.id,
        game_date: raw.game_date,
        home_team_id: raw.home_team_id,
        visitor_team_id: raw.visitor_team_id,
        home_team_name: raw.home_team_name,
        visitor_team_name: raw.visitor_team_name,
        home_score: raw.home_score,
        visitor_score: raw.visitor_score,
        status: raw.game_status,
        game_type: raw.game_type,
        field: raw.field.map(|f| FieldRef { id: f.id, name: f.name, short_name: f.short_name }),
        league: raw.league,
        season: raw.season,
        comment: raw.comment.unwrap_or_default(),
        umpire_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{FilterType, compute_window};
    use crate::{GameStatus, GameType, Notifications};
    use chrono::{NaiveDate, TimeZone, Utc};
    use mockito::Matcher;

    const GAMES_JSON: &str = r#"[
        {
            "id": "g2",
            "gameDate": "2024-06-20T23:00:00Z",
            "homeTeamId": "t1",
            "visitorTeamId": "t3",
            "gameStatus": 0,
            "gameType": 1,
            "league": {"id": "ls1", "name": "Majors"},
            "season": {"id": "s1", "name": "2024"}
        },
        {
            "id": "g1",
            "gameDate": "2024-06-15T18:00:00Z",
            "homeTeamId": "t1",
            "visitorTeamId": "t2",
            "homeTeamName": "Cubs",
            "visitorTeamName": "Mets",
            "homeScore": 4,
            "visitorScore": 2,
            "gameStatus": 1,
            "gameType": 0,
            "field": {"id": "f1", "name": "Memorial Park", "shortName": "MP"},
            "league": {"id": "ls1", "name": "Majors"},
            "season": {"id": "s1", "name": "2024"},
            "comment": "Opening day",
            "umpire1": "u1",
            "umpire2": ""
        }
    ]"#;

    fn api(server: &mockito::Server) -> DracoApi {
        DracoApi::new(server.url(), "42")
    }

    fn draft() -> GameDraft {
        GameDraft {
            league_season_id: "ls1".into(),
            game_date: Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap(),
            home_team_id: "t1".into(),
            visitor_team_id: "t2".into(),
            field_id: None,
            comment: "Makeup".into(),
            game_type: GameType::Playoff,
        }
    }

    #[tokio::test]
    async fn current_season_is_read_from_account_scope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/accounts/42/seasons/current")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "s1", "name": "2024 Spring"}"#)
            .create_async()
            .await;

        let season = api(&server).fetch_current_season().await.unwrap();
        assert_eq!(season, Season { id: "s1".into(), name: "2024 Spring".into() });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn games_request_carries_window_bounds_and_sorts_by_date() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/accounts/42/seasons/s1/games")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("startDate".into(), "2024-05-31".into()),
                Matcher::UrlEncoded("endDate".into(), "2024-07-01".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(GAMES_JSON)
            .create_async()
            .await;

        let window = compute_window(FilterType::Month, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let games = api(&server).fetch_games("s1", &window).await.unwrap();
        mock.assert_async().await;

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, "g1");
        assert_eq!(games[0].status, GameStatus::Completed);
        assert_eq!(games[0].score(), Some((2, 4)));
        assert_eq!(games[0].field.as_ref().map(|f| f.short_name.as_str()), Some("MP"));
        assert_eq!(games[0].umpire_ids, vec!["u1".to_string()]);
        assert_eq!(games[1].game_type, GameType::Playoff);
        assert_eq!(games[1].comment, "");
    }

    #[tokio::test]
    async fn leagues_flatten_divisions_and_unassigned_teams() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/accounts/42/seasons/s1/leagues")
            .match_query(Matcher::UrlEncoded("includeTeams".into(), "true".into()))
            .with_status(200)
            .with_body(
                r#"[{
                    "id": "ls1",
                    "league": {"id": "l1", "name": "Majors"},
                    "divisions": [
                        {"teams": [{"id": "t2", "name": "Mets"}, {"id": "t1", "name": "Cubs"}]},
                        {"teams": [{"id": "t3", "name": "Astros"}]}
                    ],
                    "unassignedTeams": [{"id": "t4", "name": "Braves"}, {"id": "t1", "name": "Cubs"}]
                }]"#,
            )
            .create_async()
            .await;

        let leagues = api(&server).fetch_leagues("s1").await.unwrap();
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].id, "ls1");
        assert_eq!(leagues[0].name, "Majors");
        let names: Vec<_> = leagues[0].teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Astros", "Braves", "Cubs", "Mets"]);
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_dedicated_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/accounts/42/seasons/s1/leagues")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = api(&server).fetch_leagues("s1").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("Failed to load leagues"), "Failed to load leagues");
    }

    #[tokio::test]
    async fn server_message_is_preferred_over_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/accounts/42/seasons/s1/games")
            .with_status(409)
            .with_body(r#"{"message": "Field already booked"}"#)
            .create_async()
            .await;

        let err = api(&server).create_game("tok", "s1", &draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 409, .. }));
        assert_eq!(err.user_message("Failed to create game"), "Field already booked");
    }

    #[tokio::test]
    async fn unparseable_error_body_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/accounts/42/seasons/s1/games/g1")
            .with_status(500)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = api(&server).delete_game("tok", "s1", "g1").await.unwrap_err();
        assert_eq!(err.user_message("Failed to delete game"), "Failed to delete game");
    }

    #[tokio::test]
    async fn create_sends_bearer_token_and_camel_case_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/accounts/42/seasons/s1/games")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "leagueSeasonId": "ls1",
                "gameDate": "2024-06-15T18:00:00Z",
                "homeTeamId": "t1",
                "visitorTeamId": "t2",
                "fieldId": null,
                "comment": "Makeup",
                "gameType": 1
            })))
            .with_status(201)
            .with_body(r#"{"id": "g9"}"#)
            .create_async()
            .await;

        api(&server).create_game("tok", "s1", &draft()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_omits_league_season() {
        let mut server = mockito::Server::new_async().await;
        let mut body = draft();
        body.field_id = Some("f1".into());
        let mock = server
            .mock("PUT", "/api/accounts/42/seasons/s1/games/g1")
            .match_body(Matcher::Json(serde_json::json!({
                "gameDate": "2024-06-15T18:00:00Z",
                "homeTeamId": "t1",
                "visitorTeamId": "t2",
                "fieldId": "f1",
                "comment": "Makeup",
                "gameType": 1
            })))
            .with_status(200)
            .create_async()
            .await;

        api(&server).update_game("tok", "s1", "g1", &body).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn results_include_notification_flags() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/accounts/42/seasons/s1/games/g1/results")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "homeScore": 0,
                "visitorScore": 7,
                "gameStatus": 4,
                "emailPlayers": true,
                "postToTwitter": false,
                "postToBluesky": true,
                "postToFacebook": false
            })))
            .with_status(200)
            .create_async()
            .await;

        let results = GameResults {
            home_score: 0,
            visitor_score: 7,
            status: GameStatus::Forfeit,
            notify: Notifications { email_players: true, post_to_bluesky: true, ..Default::default() },
        };
        api(&server).submit_results("tok", "s1", "g1", &results).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_unauthorized_is_distinguished() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/accounts/42/seasons/s1/games/g1")
            .with_status(401)
            .with_body(r#"{"message": "Token expired"}"#)
            .create_async()
            .await;

        let err = api(&server).delete_game("tok", "s1", "g1").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = DracoApi::new("http://localhost:3001/", "7");
        assert_eq!(api.account_url("/fields"), "http://localhost:3001/api/accounts/7/fields");
    }

    #[test]
    fn field_mapping_defaults_missing_address_parts() {
        let field = map_field(FieldResponse {
            id: "f1".into(),
            name: "Memorial Park".into(),
            city: Some("Springfield".into()),
            ..Default::default()
        });
        assert_eq!(field.city, "Springfield");
        assert_eq!(field.address, "");
    }
}
