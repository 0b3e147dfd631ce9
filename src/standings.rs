//! League table.
//!
//! Standings are never edited incrementally: every recalculation reloads all
//! teams and all completed matches, folds them into fresh counters and
//! overwrites one row per team. Running it twice over the same matches gives
//! the same table.

use std::{cmp::Ordering, collections::HashMap};

use chrono::{NaiveDateTime, Utc};
use diesel::{prelude::*, SqliteConnection};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    database::{
        model::{Match, NewStanding, Standing, Team},
        schema::{matches, standings, teams},
    },
    error::ApiError,
    match_result::Winner,
    r#match::{MatchDetails, MatchStatus, TeamSnapshot},
};

pub const POINTS_FOR_WIN: i32 = 3;
pub const POINTS_FOR_DRAW: i32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingView {
    pub id: i32,
    pub team: TeamSnapshot,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub points: i32,
    pub set_won: i32,
    pub set_lost: i32,
    pub updated_at: NaiveDateTime,
}

impl From<Standing> for StandingView {
    fn from(row: Standing) -> Self {
        StandingView {
            id: row.id,
            team: TeamSnapshot {
                id: row.team_id,
                name: row.team_name,
                logo_url: row.team_logo,
            },
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            points: row.points,
            set_won: row.set_won,
            set_lost: row.set_lost,
            updated_at: row.updated_at,
        }
    }
}

fn zeroed(team: &Team, now: NaiveDateTime) -> NewStanding {
    NewStanding {
        team_id: team.id,
        team_name: team.name.clone(),
        team_logo: team.logo_url.clone(),
        played: 0,
        won: 0,
        drawn: 0,
        lost: 0,
        points: 0,
        set_won: 0,
        set_lost: 0,
        updated_at: now,
    }
}

/// Folds completed matches into one standing per team, in the order of `teams`.
///
/// Matches that are not completed are skipped. A side that is not among
/// `teams` is ignored while the other side is still counted.
pub fn tally(teams: &[Team], matches: &[MatchDetails], now: NaiveDateTime) -> Vec<NewStanding> {
    let mut table: Vec<NewStanding> = teams.iter().map(|t| zeroed(t, now)).collect();
    let index: HashMap<i32, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| (team.id, i))
        .collect();

    for m in matches.iter().filter(|m| m.is_completed()) {
        let home = index.get(&m.home_team.id).copied();
        let away = index.get(&m.away_team.id).copied();

        for side in [home, away].into_iter().flatten() {
            table[side].played += 1;
        }

        if let Some(scores) = &m.scores {
            let sets = scores.total_sets;
            if let Some(h) = home {
                table[h].set_won += sets.home;
                table[h].set_lost += sets.away;
            }
            if let Some(a) = away {
                table[a].set_won += sets.away;
                table[a].set_lost += sets.home;
            }
        }

        match m.winner_team {
            Some(Winner::Home) => award_win(&mut table, home, away),
            Some(Winner::Away) => award_win(&mut table, away, home),
            Some(Winner::Draw) => {
                for side in [home, away].into_iter().flatten() {
                    table[side].drawn += 1;
                    table[side].points += POINTS_FOR_DRAW;
                }
            }
            None => {}
        }
    }

    table
}

fn award_win(table: &mut [NewStanding], winner: Option<usize>, loser: Option<usize>) {
    if let Some(w) = winner {
        table[w].won += 1;
        table[w].points += POINTS_FOR_WIN;
    }
    if let Some(l) = loser {
        table[l].lost += 1;
    }
}

/// Points, then set difference, then sets won, then team name.
pub fn compare(a: &StandingView, b: &StandingView) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| (b.set_won - b.set_lost).cmp(&(a.set_won - a.set_lost)))
        .then_with(|| b.set_won.cmp(&a.set_won))
        .then_with(|| a.team.name.cmp(&b.team.name))
}

pub fn sort_table(table: &mut [StandingView]) {
    table.sort_by(compare);
}

/// Current table in display order.
pub fn load_table(conn: &mut SqliteConnection) -> Result<Vec<StandingView>, ApiError> {
    let rows = standings::table.load::<Standing>(conn)?;
    let mut table: Vec<StandingView> = rows.into_iter().map(StandingView::from).collect();
    sort_table(&mut table);
    Ok(table)
}

/// Rebuilds every standing from the completed matches and returns the new
/// table in display order.
pub fn recalculate(conn: &mut SqliteConnection) -> Result<Vec<StandingView>, ApiError> {
    conn.transaction::<_, ApiError, _>(|conn| {
        let all_teams = teams::table.order(teams::id.asc()).load::<Team>(conn)?;
        let completed = matches::table
            .filter(matches::status.eq(MatchStatus::Completed.as_str()))
            .load::<Match>(conn)?
            .iter()
            .map(MatchDetails::from_match)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Recalculating standings for {} teams over {} completed matches",
            all_teams.len(),
            completed.len()
        );

        let rows = tally(&all_teams, &completed, Utc::now().naive_utc());
        for row in &rows {
            diesel::insert_into(standings::table)
                .values(row)
                .on_conflict(standings::team_id)
                .do_update()
                .set(row)
                .execute(conn)?;
        }

        let team_ids: Vec<i32> = all_teams.iter().map(|t| t.id).collect();
        let removed = diesel::delete(standings::table.filter(standings::team_id.ne_all(team_ids)))
            .execute(conn)?;
        if removed > 0 {
            info!("Removed {removed} standing(s) of deleted teams");
        }

        load_table(conn)
    })
}
