use crate::state::network::LoadingState;
use crate::state::schedule::GamesRequest;
use crossterm::event::KeyEvent;
use draco_api::{ApiError, Field, Game, GameDraft, GameResults, LeagueSeason, Season, ViewWindow};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Current season, its leagues with teams, and the account's fields.
    LoadStaticData,
    LoadGames(GamesRequest),
    CreateGame { token: String, season_id: String, draft: GameDraft },
    UpdateGame { token: String, season_id: String, game_id: String, draft: GameDraft },
    DeleteGame { token: String, season_id: String, game_id: String },
    SubmitResults { token: String, season_id: String, game_id: String, results: GameResults },
}

impl NetworkRequest {
    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            NetworkRequest::LoadStaticData | NetworkRequest::LoadGames(_) => None,
            NetworkRequest::CreateGame { .. } => Some(Mutation::Create),
            NetworkRequest::UpdateGame { game_id, .. } => {
                Some(Mutation::Update { game_id: game_id.clone() })
            }
            NetworkRequest::DeleteGame { game_id, .. } => {
                Some(Mutation::Delete { game_id: game_id.clone() })
            }
            NetworkRequest::SubmitResults { game_id, .. } => {
                Some(Mutation::Results { game_id: game_id.clone() })
            }
        }
    }
}

/// A write against the schedule, echoed back with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update { game_id: String },
    Delete { game_id: String },
    Results { game_id: String },
}

impl Mutation {
    /// Shown when the server gives no message of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Mutation::Create => "Failed to create game",
            Mutation::Update { .. } => "Failed to update game",
            Mutation::Delete { .. } => "Failed to delete game",
            Mutation::Results { .. } => "Failed to save game results",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Mutation::Create => "Game created",
            Mutation::Update { .. } => "Game updated",
            Mutation::Delete { .. } => "Game deleted",
            Mutation::Results { .. } => "Game results saved",
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    StaticDataLoaded { season: Season, leagues: Vec<LeagueSeason>, fields: Vec<Field> },
    GamesLoaded { generation: u64, window: ViewWindow, games: Vec<Game> },
    GamesFailed { generation: u64, message: String },
    MutationSucceeded { mutation: Mutation },
    MutationFailed { mutation: Mutation, error: ApiError },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
}
