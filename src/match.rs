use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    database::model::{Match, NewMatch, Team},
    error::ApiError,
    match_result::{Scores, Winner},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Completed => "Completed",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(MatchStatus::Scheduled),
            "In Progress" => Ok(MatchStatus::InProgress),
            "Completed" => Ok(MatchStatus::Completed),
            "Postponed" => Ok(MatchStatus::Postponed),
            "Cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}

/// Copy of a team taken when the match was written.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub id: i32,
    pub name: String,
    pub logo_url: String,
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        TeamSnapshot {
            id: team.id,
            name: team.name.clone(),
            logo_url: team.logo_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub id: i32,
    pub season_id: i32,
    pub tournament: String,
    pub stage: String,
    pub game_day: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub home_team: TeamSnapshot,
    pub away_team: TeamSnapshot,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_team: Option<Winner>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MatchDetails {
    pub fn from_match(row: &Match) -> Result<MatchDetails, ApiError> {
        let status = row.status.parse().map_err(ApiError::Internal)?;
        let scores = row
            .scores
            .as_deref()
            .map(serde_json::from_str::<Scores>)
            .transpose()?;
        let winner_team = row
            .winner_team
            .as_deref()
            .map(Winner::from_str)
            .transpose()
            .map_err(ApiError::Internal)?;

        Ok(MatchDetails {
            id: row.id,
            season_id: row.season_id,
            tournament: row.tournament.clone(),
            stage: row.stage.clone(),
            game_day: row.game_day.clone(),
            date: row.date,
            location: row.location.clone(),
            home_team: TeamSnapshot {
                id: row.home_team_id,
                name: row.home_team_name.clone(),
                logo_url: row.home_team_logo.clone(),
            },
            away_team: TeamSnapshot {
                id: row.away_team_id,
                name: row.away_team_name.clone(),
                logo_url: row.away_team_logo.clone(),
            },
            status,
            scores,
            winner_team,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}

/// A match as it is about to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchDraft {
    pub season_id: i32,
    pub tournament: String,
    pub stage: String,
    pub game_day: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub home_team: TeamSnapshot,
    pub away_team: TeamSnapshot,
    pub status: MatchStatus,
    pub scores: Option<Scores>,
    pub winner_team: Option<Winner>,
}

impl From<MatchDetails> for MatchDraft {
    fn from(details: MatchDetails) -> Self {
        MatchDraft {
            season_id: details.season_id,
            tournament: details.tournament,
            stage: details.stage,
            game_day: details.game_day,
            date: details.date,
            location: details.location,
            home_team: details.home_team,
            away_team: details.away_team,
            status: details.status,
            scores: details.scores,
            winner_team: details.winner_team,
        }
    }
}

impl MatchDraft {
    /// Validates the draft, normalises its scores and fills in the winner of a
    /// completed match when none was given.
    pub fn resolve(mut self) -> Result<Self, ApiError> {
        if self.home_team.id == self.away_team.id {
            return Err(ApiError::validation(
                "Home and away team must be different",
            ));
        }
        for (field, value) in [
            ("tournament", &self.tournament),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::validation(format!("{field} is required")));
            }
        }

        self.scores = self
            .scores
            .map(Scores::normalized)
            .transpose()
            .map_err(ApiError::Validation)?;

        if self.winner_team.is_none() && self.status == MatchStatus::Completed {
            self.winner_team = self.scores.as_ref().and_then(Scores::winner);
        }

        Ok(self)
    }

    pub fn into_row(
        self,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Result<NewMatch, ApiError> {
        let scores = self
            .scores
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(NewMatch {
            season_id: self.season_id,
            tournament: self.tournament,
            stage: self.stage,
            game_day: self.game_day,
            date: self.date,
            location: self.location,
            home_team_id: self.home_team.id,
            home_team_name: self.home_team.name,
            home_team_logo: self.home_team.logo_url,
            away_team_id: self.away_team.id,
            away_team_name: self.away_team.name,
            away_team_logo: self.away_team.logo_url,
            status: self.status.as_str().to_string(),
            scores,
            winner_team: self.winner_team.map(|w| w.as_str().to_string()),
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::match_result::{SetScore, SetTotals};

    fn snapshot(id: i32, name: &str) -> TeamSnapshot {
        TeamSnapshot {
            id,
            name: name.to_string(),
            logo_url: format!("/uploads/{name}.png"),
        }
    }

    fn draft(status: MatchStatus, scores: Option<Scores>) -> MatchDraft {
        MatchDraft {
            season_id: 1,
            tournament: "National League".to_string(),
            stage: "Regular".to_string(),
            game_day: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 10, 5)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            location: "Sports Hall".to_string(),
            home_team: snapshot(1, "Lions"),
            away_team: snapshot(2, "Eagles"),
            status,
            scores,
            winner_team: None,
        }
    }

    fn three_one() -> Scores {
        Scores {
            sets: vec![
                SetScore { home: 25, away: 19 },
                SetScore { home: 25, away: 27 },
                SetScore { home: 25, away: 21 },
                SetScore { home: 25, away: 16 },
            ],
            total_sets: SetTotals::default(),
        }
    }

    #[test]
    fn status_labels_match_the_wire_format() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!("In Progress".parse::<MatchStatus>(), Ok(MatchStatus::InProgress));
        assert!("Finished".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn completed_match_derives_its_winner() {
        let resolved = draft(MatchStatus::Completed, Some(three_one()))
            .resolve()
            .unwrap();
        assert_eq!(resolved.winner_team, Some(Winner::Home));
        assert_eq!(
            resolved.scores.unwrap().total_sets,
            SetTotals { home: 3, away: 1 }
        );
    }

    #[test]
    fn explicit_winner_is_kept() {
        let mut d = draft(MatchStatus::Completed, Some(three_one()));
        d.winner_team = Some(Winner::Draw);
        assert_eq!(d.resolve().unwrap().winner_team, Some(Winner::Draw));
    }

    #[test]
    fn scheduled_match_gets_no_winner() {
        let resolved = draft(MatchStatus::Scheduled, Some(three_one()))
            .resolve()
            .unwrap();
        assert_eq!(resolved.winner_team, None);
    }

    #[test]
    fn team_cannot_play_itself() {
        let mut d = draft(MatchStatus::Scheduled, None);
        d.away_team = snapshot(1, "Lions");
        assert!(matches!(d.resolve(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn row_round_trips_into_details() {
        let resolved = draft(MatchStatus::Completed, Some(three_one()))
            .resolve()
            .unwrap();
        let created = resolved.date;
        let new = resolved.clone().into_row(created, created).unwrap();
        let row = Match {
            id: 7,
            season_id: new.season_id,
            tournament: new.tournament,
            stage: new.stage,
            game_day: new.game_day,
            date: new.date,
            location: new.location,
            home_team_id: new.home_team_id,
            home_team_name: new.home_team_name,
            home_team_logo: new.home_team_logo,
            away_team_id: new.away_team_id,
            away_team_name: new.away_team_name,
            away_team_logo: new.away_team_logo,
            status: new.status,
            scores: new.scores,
            winner_team: new.winner_team,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };

        let details = MatchDetails::from_match(&row).unwrap();
        assert!(details.is_completed());
        assert_eq!(MatchDraft::from(details), resolved);
    }
}
