use crate::state::messages::{Mutation, NetworkRequest, NetworkResponse};
use crate::state::schedule::GamesRequest;
use draco_api::client::{ApiError, ApiResult, DracoApi};
use draco_api::{GameDraft, GameResults};
use futures_util::future::join;
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: DracoApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: DracoApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self { client, requests, responses, is_loading: Arc::new(AtomicBool::new(false)) }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let mutation = request.mutation();
            let generation = match &request {
                NetworkRequest::LoadGames(r) => Some(r.generation),
                _ => None,
            };

            let result = match request {
                NetworkRequest::LoadStaticData => self.handle_load_static_data().await,
                NetworkRequest::LoadGames(r) => self.handle_load_games(r).await,
                NetworkRequest::CreateGame { token, season_id, draft } => {
                    self.handle_create_game(&token, &season_id, &draft).await
                }
                NetworkRequest::UpdateGame { token, season_id, game_id, draft } => {
                    self.handle_update_game(&token, &season_id, game_id, &draft).await
                }
                NetworkRequest::DeleteGame { token, season_id, game_id } => {
                    self.handle_delete_game(&token, &season_id, game_id).await
                }
                NetworkRequest::SubmitResults { token, season_id, game_id, results } => {
                    self.handle_submit_results(&token, &season_id, game_id, &results).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| failure_response(err, mutation, generation));

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    /// The season is required. Leagues and fields degrade to empty lists so the
    /// schedule still renders without filter or form choices.
    async fn handle_load_static_data(&self) -> ApiResult<NetworkResponse> {
        debug!("loading current season for account {}", self.client.account_id());
        let season = self.client.fetch_current_season().await?;

        let (leagues, fields) =
            join(self.client.fetch_leagues(&season.id), self.client.fetch_fields()).await;
        let leagues = leagues.unwrap_or_else(|e| {
            warn!("leagues unavailable: {e}");
            Vec::new()
        });
        let fields = fields.unwrap_or_else(|e| {
            warn!("fields unavailable: {e}");
            Vec::new()
        });

        Ok(NetworkResponse::StaticDataLoaded { season, leagues, fields })
    }

    async fn handle_load_games(&self, request: GamesRequest) -> ApiResult<NetworkResponse> {
        debug!(
            "loading games {}..{} (generation {})",
            request.window.start_param(),
            request.window.end_param(),
            request.generation
        );
        let games = self.client.fetch_games(&request.season_id, &request.window).await?;
        Ok(NetworkResponse::GamesLoaded {
            generation: request.generation,
            window: request.window,
            games,
        })
    }

    async fn handle_create_game(
        &self,
        token: &str,
        season_id: &str,
        draft: &GameDraft,
    ) -> ApiResult<NetworkResponse> {
        self.client.create_game(token, season_id, draft).await?;
        Ok(NetworkResponse::MutationSucceeded { mutation: Mutation::Create })
    }

    async fn handle_update_game(
        &self,
        token: &str,
        season_id: &str,
        game_id: String,
        draft: &GameDraft,
    ) -> ApiResult<NetworkResponse> {
        self.client.update_game(token, season_id, &game_id, draft).await?;
        Ok(NetworkResponse::MutationSucceeded { mutation: Mutation::Update { game_id } })
    }

    async fn handle_delete_game(
        &self,
        token: &str,
        season_id: &str,
        game_id: String,
    ) -> ApiResult<NetworkResponse> {
        self.client.delete_game(token, season_id, &game_id).await?;
        Ok(NetworkResponse::MutationSucceeded { mutation: Mutation::Delete { game_id } })
    }

    async fn handle_submit_results(
        &self,
        token: &str,
        season_id: &str,
        game_id: String,
        results: &GameResults,
    ) -> ApiResult<NetworkResponse> {
        self.client.submit_results(token, season_id, &game_id, results).await?;
        Ok(NetworkResponse::MutationSucceeded { mutation: Mutation::Results { game_id } })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

/// Hand a request to the worker. Returns `false` and logs when the worker
/// is gone.
pub async fn queue_request(
    network_requests: &mpsc::Sender<NetworkRequest>,
    request: Option<NetworkRequest>,
) -> bool {
    let Some(request) = request else {
        return true;
    };
    if let Err(e) = network_requests.send(request).await {
        error!("Failed to queue network request: {e}");
        return false;
    }
    true
}

/// Route a failed request back to whoever is waiting on it.
fn failure_response(
    err: ApiError,
    mutation: Option<Mutation>,
    generation: Option<u64>,
) -> NetworkResponse {
    warn!("request failed: {err}");
    if let Some(mutation) = mutation {
        return NetworkResponse::MutationFailed { mutation, error: err };
    }
    if let Some(generation) = generation {
        return NetworkResponse::GamesFailed {
            generation,
            message: err.user_message("Failed to load games"),
        };
    }
    NetworkResponse::Error { message: err.user_message("Failed to load schedule") }
}
