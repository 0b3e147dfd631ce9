use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Best of five.
pub const MAX_SETS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Home,
    Away,
    Draw,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Home => "home",
            Winner::Away => "away",
            Winner::Draw => "draw",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Winner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Winner::Home),
            "away" => Ok(Winner::Away),
            "draw" => Ok(Winner::Draw),
            other => Err(format!("unknown winner '{other}'")),
        }
    }
}

/// Points of a single set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub home: i32,
    pub away: i32,
}

/// Sets won by each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTotals {
    pub home: i32,
    pub away: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    #[serde(default)]
    pub sets: Vec<SetScore>,
    #[serde(default)]
    pub total_sets: SetTotals,
}

impl Scores {
    /// Checks the scores and, when individual sets are given, recomputes the
    /// set totals from them.
    pub fn normalized(mut self) -> Result<Self, String> {
        if self.sets.len() > MAX_SETS {
            return Err(format!("A match has at most {MAX_SETS} sets"));
        }

        for (i, set) in self.sets.iter().enumerate() {
            if set.home < 0 || set.away < 0 {
                return Err(format!("Set {} has a negative score", i + 1));
            }
            if set.home == set.away {
                return Err(format!("Set {} cannot end level", i + 1));
            }
        }

        if !self.sets.is_empty() {
            self.total_sets = SetTotals {
                home: self.sets.iter().filter(|s| s.home > s.away).count() as i32,
                away: self.sets.iter().filter(|s| s.away > s.home).count() as i32,
            };
        }

        let totals = self.total_sets;
        if totals.home < 0 || totals.away < 0 {
            return Err("Set totals cannot be negative".to_string());
        }
        let played = totals.home.checked_add(totals.away).map(|n| n as usize);
        if played.map_or(true, |n| n > MAX_SETS) {
            return Err(format!("A match has at most {MAX_SETS} sets"));
        }

        Ok(self)
    }

    /// Winner implied by the set totals, `None` when no set was recorded.
    pub fn winner(&self) -> Option<Winner> {
        let SetTotals { home, away } = self.total_sets;
        match home.cmp(&away) {
            Ordering::Greater => Some(Winner::Home),
            Ordering::Less => Some(Winner::Away),
            Ordering::Equal if home == 0 => None,
            Ordering::Equal => Some(Winner::Draw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(pairs: &[(i32, i32)]) -> Scores {
        Scores {
            sets: pairs
                .iter()
                .map(|&(home, away)| SetScore { home, away })
                .collect(),
            total_sets: SetTotals::default(),
        }
    }

    #[test]
    fn totals_follow_the_individual_sets() {
        let scores = sets(&[(25, 20), (22, 25), (25, 18), (25, 23)])
            .normalized()
            .unwrap();
        assert_eq!(scores.total_sets, SetTotals { home: 3, away: 1 });
        assert_eq!(scores.winner(), Some(Winner::Home));
    }

    #[test]
    fn provided_totals_are_kept_without_sets() {
        let scores = Scores {
            sets: vec![],
            total_sets: SetTotals { home: 0, away: 3 },
        }
        .normalized()
        .unwrap();
        assert_eq!(scores.winner(), Some(Winner::Away));
    }

    #[test]
    fn level_set_is_rejected() {
        let err = sets(&[(25, 25)]).normalized().unwrap_err();
        assert!(err.contains("level"));
    }

    #[test]
    fn six_sets_is_rejected() {
        assert!(sets(&[(25, 1); 6]).normalized().is_err());
    }

    #[test]
    fn huge_totals_are_rejected() {
        let scores = Scores {
            sets: vec![],
            total_sets: SetTotals {
                home: i32::MAX,
                away: 1,
            },
        };
        assert!(scores.normalized().is_err());
    }

    #[test]
    fn negative_points_are_rejected() {
        assert!(sets(&[(-1, 25)]).normalized().is_err());
    }

    #[test]
    fn empty_scores_have_no_winner() {
        assert_eq!(Scores::default().winner(), None);
        let level = Scores {
            sets: vec![],
            total_sets: SetTotals { home: 2, away: 2 },
        };
        assert_eq!(level.winner(), Some(Winner::Draw));
    }

    #[test]
    fn winner_round_trips_through_its_label() {
        for winner in [Winner::Home, Winner::Away, Winner::Draw] {
            assert_eq!(winner.as_str().parse::<Winner>(), Ok(winner));
        }
        assert!("nobody".parse::<Winner>().is_err());
    }
}
