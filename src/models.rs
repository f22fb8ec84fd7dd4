use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub release_date: String,
    pub runtime_label: String,
    pub genre: String,
    pub imdb_rating: f32,
    pub plot: String,
    pub actors: String,
    pub director: String,
}

impl MovieDetail {
    /// Leading integer of the runtime label ("148 min" -> 148), 0 when absent.
    pub fn runtime_minutes(&self) -> u32 {
        parse_leading_int(&self.runtime_label).unwrap_or(0)
    }
}

/// A personal rating between 1 and 10 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UserRating(u8);

impl UserRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UserRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "rating {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<UserRating> for u8 {
    fn from(rating: UserRating) -> Self {
        rating.0
    }
}

impl fmt::Display for UserRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime_minutes: u32,
    pub imdb_rating: f32,
    pub user_rating: UserRating,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: UserRating) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            runtime_minutes: detail.runtime_minutes(),
            imdb_rating: detail.imdb_rating,
            user_rating,
        }
    }
}

pub(crate) fn parse_leading_int(input: &str) -> Option<u32> {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_enforced() {
        assert!(UserRating::new(0).is_none());
        assert_eq!(UserRating::new(1).map(UserRating::get), Some(1));
        assert_eq!(UserRating::new(10).map(UserRating::get), Some(10));
        assert!(UserRating::new(11).is_none());
    }

    #[test]
    fn rating_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<UserRating>("7").is_ok());
        assert!(serde_json::from_str::<UserRating>("12").is_err());
        assert_eq!(
            serde_json::to_string(&UserRating::new(9).unwrap()).unwrap(),
            "9"
        );
    }

    #[test]
    fn parses_runtime_label() {
        assert_eq!(parse_leading_int("148 min"), Some(148));
        assert_eq!(parse_leading_int(" 90 min"), Some(90));
        assert_eq!(parse_leading_int("N/A"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
