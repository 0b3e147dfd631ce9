use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;

use super::schema::*;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = players)]
pub struct Player {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: f64,
    pub position: String,
    pub jersey_number: i32,
    pub nationality: String,
    pub image_url: String,
    pub bio: Option<String>,
    pub featured: bool,
    /// JSON array of season ids
    pub season_ids: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = players)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: f64,
    pub position: String,
    pub jersey_number: i32,
    pub nationality: String,
    pub image_url: String,
    pub bio: Option<String>,
    pub featured: bool,
    pub season_ids: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = players)]
pub struct PlayerChangeset {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub height: Option<f64>,
    pub position: Option<String>,
    pub jersey_number: Option<i32>,
    pub nationality: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<Option<String>>,
    pub featured: Option<bool>,
    pub season_ids: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = teams)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub logo_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub logo_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = teams)]
pub struct TeamChangeset {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: i32,
    pub season_id: i32,
    pub tournament: String,
    pub stage: String,
    pub game_day: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub home_team_id: i32,
    pub home_team_name: String,
    pub home_team_logo: String,
    pub away_team_id: i32,
    pub away_team_name: String,
    pub away_team_logo: String,
    pub status: String,
    /// JSON encoded `Scores`
    pub scores: Option<String>,
    pub winner_team: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full match row, used for inserts and for whole-row rewrites on update.
#[derive(Insertable, AsChangeset, Clone, Debug)]
#[diesel(table_name = matches, treat_none_as_null = true)]
pub struct NewMatch {
    pub season_id: i32,
    pub tournament: String,
    pub stage: String,
    pub game_day: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub home_team_id: i32,
    pub home_team_name: String,
    pub home_team_logo: String,
    pub away_team_id: i32,
    pub away_team_name: String,
    pub away_team_logo: String,
    pub status: String,
    pub scores: Option<String>,
    pub winner_team: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = standings)]
pub struct Standing {
    pub id: i32,
    pub team_id: i32,
    pub team_name: String,
    pub team_logo: String,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub points: i32,
    pub set_won: i32,
    pub set_lost: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone, Debug, PartialEq)]
#[diesel(table_name = standings)]
pub struct NewStanding {
    pub team_id: i32,
    pub team_name: String,
    pub team_logo: String,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub points: i32,
    pub set_won: i32,
    pub set_lost: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = standings)]
pub struct StandingChangeset {
    pub played: Option<i32>,
    pub won: Option<i32>,
    pub drawn: Option<i32>,
    pub lost: Option<i32>,
    pub points: Option<i32>,
    pub set_won: Option<i32>,
    pub set_lost: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = sponsors)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: i32,
    pub name: String,
    pub logo_url: String,
    pub website: Option<String>,
    pub tier: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = sponsors)]
pub struct NewSponsor {
    pub name: String,
    pub logo_url: String,
    pub website: Option<String>,
    pub tier: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = sponsors)]
pub struct SponsorChangeset {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<Option<String>>,
    pub tier: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = seasons)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: i32,
    pub name: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = seasons)]
pub struct NewSeason {
    pub name: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = seasons)]
pub struct SeasonChangeset {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = news)]
pub struct NewsArticle {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    /// JSON array of tags
    pub tags: String,
    pub status: String,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = news)]
pub struct NewNewsArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: String,
    pub status: String,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = news)]
pub struct NewsChangeset {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<Option<String>>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
#[diesel(table_name = contact_messages)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = contact_messages)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = tokens)]
pub struct Token {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub invalidated: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tokens)]
pub struct NewToken {
    pub token: String,
    pub user_id: i32,
    pub invalidated: bool,
    pub created_at: NaiveDateTime,
}
