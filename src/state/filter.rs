use draco_api::{Game, LeagueSeason, Team};
use serde::{Deserialize, Serialize};

/// League/team narrowing applied on top of the fetched games.
///
/// A team is only meaningful inside a chosen league, so the fields are
/// private and every league change clears the team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    league_season_id: Option<String>,
    team_season_id: Option<String>,
}

impl FilterSelection {
    pub fn league(&self) -> Option<&str> {
        self.league_season_id.as_deref()
    }

    pub fn team(&self) -> Option<&str> {
        self.team_season_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.league_season_id.is_none() && self.team_season_id.is_none()
    }

    pub fn set_league(&mut self, league_season_id: Option<String>) {
        self.league_season_id = league_season_id.filter(|id| !id.is_empty());
        self.team_season_id = None;
    }

    /// Ignored while no league is chosen.
    pub fn set_team(&mut self, team_season_id: Option<String>) {
        if self.league_season_id.is_some() {
            self.team_season_id = team_season_id.filter(|id| !id.is_empty());
        }
    }

    pub fn clear(&mut self) {
        self.set_league(None);
    }

    /// All leagues → first → … → last → all leagues.
    pub fn cycle_league(&mut self, leagues: &[LeagueSeason]) {
        let next = cycle_id(leagues.iter().map(|l| l.id.as_str()), self.league());
        self.set_league(next);
    }

    /// All teams → first → … → last → all teams, within the chosen league.
    pub fn cycle_team(&mut self, leagues: &[LeagueSeason]) {
        let Some(league) = self.league().and_then(|id| leagues.iter().find(|l| l.id == id)) else {
            return;
        };
        let next = cycle_id(league.teams.iter().map(|t| t.id.as_str()), self.team());
        self.set_team(next);
    }

    /// Drop selections that no longer exist in the loaded league list.
    pub fn retain_known(&mut self, leagues: &[LeagueSeason]) {
        let Some(league) = self.league().and_then(|id| leagues.iter().find(|l| l.id == id)) else {
            self.clear();
            return;
        };
        if let Some(team) = self.team()
            && league.team(team).is_none()
        {
            self.team_season_id = None;
        }
    }

    pub fn matches(&self, game: &Game) -> bool {
        self.league().is_none_or(|league| game.league.id == league)
            && self.team().is_none_or(|team| game.involves_team(team))
    }

    pub fn league_label<'a>(&self, leagues: &'a [LeagueSeason]) -> &'a str {
        self.league()
            .and_then(|id| leagues.iter().find(|l| l.id == id))
            .map(|l| l.name.as_str())
            .unwrap_or("All leagues")
    }

    pub fn team_label<'a>(&self, leagues: &'a [LeagueSeason]) -> &'a str {
        self.team()
            .and_then(|id| find_team(leagues, id))
            .map(|t| t.name.as_str())
            .unwrap_or("All teams")
    }
}

/// Games passing the league/team selection, in their original order.
pub fn filter_games<'a>(games: &'a [Game], selection: &FilterSelection) -> Vec<&'a Game> {
    games.iter().filter(|g| selection.matches(g)).collect()
}

pub fn find_team<'a>(leagues: &'a [LeagueSeason], team_id: &str) -> Option<&'a Team> {
    leagues.iter().find_map(|l| l.team(team_id))
}

fn cycle_id<'a>(mut ids: impl Iterator<Item = &'a str>, current: Option<&str>) -> Option<String> {
    match current {
        None => ids.next().map(str::to_owned),
        Some(current) => {
            ids.find(|id| *id == current);
            ids.next().map(str::to_owned)
        }
    }
}
