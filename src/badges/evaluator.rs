//! Threshold evaluation. Pure: callers assemble the counters and the
//! already-unlocked set, we return which rules newly qualify. Rules are
//! independent of each other, so evaluation order carries no meaning,
//! and re-running with the same inputs awards nothing new.

use std::collections::HashSet;

use time::{Date, OffsetDateTime};

use crate::badges::rules::{BadgeCategory, BadgeRule, RULES};
use crate::media::repo::Media;

/// Aggregate counters derived from a user's collection and social graph.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub total: u32,
    pub movies: u32,
    pub series: u32,
    pub books: u32,
    pub games: u32,
    pub followers: u32,
    pub following: u32,
    pub genres: u32,
    pub platforms: u32,
    pub moods: u32,
    pub languages: u32,
    pub noted: u32,
}

impl CollectionStats {
    pub fn from_media(rows: &[Media], followers: u32, following: u32) -> Self {
        let mut genres: HashSet<&str> = HashSet::new();
        let mut platforms: HashSet<&str> = HashSet::new();
        let mut moods: HashSet<&str> = HashSet::new();
        let mut languages: HashSet<&str> = HashSet::new();

        let mut stats = CollectionStats {
            total: rows.len() as u32,
            followers,
            following,
            ..Default::default()
        };

        for row in rows {
            match row.media_type.as_str() {
                "movie" => stats.movies += 1,
                "series" => stats.series += 1,
                "book" => stats.books += 1,
                "game" => stats.games += 1,
                _ => {}
            }
            for (set, value) in [
                (&mut genres, row.genre.as_str()),
                (&mut platforms, row.platform.as_str()),
                (&mut moods, row.mood.as_str()),
                (&mut languages, row.language.as_str()),
            ] {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    set.insert(trimmed);
                }
            }
            if !row.notes.trim().is_empty() {
                stats.noted += 1;
            }
        }

        stats.genres = genres.len() as u32;
        stats.platforms = platforms.len() as u32;
        stats.moods = moods.len() as u32;
        stats.languages = languages.len() as u32;
        stats
    }
}

/// One-off signals from the action that triggered the evaluation.
/// Unlike the counters these are not derivable from stored state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Signals {
    /// Hour of day (0-23) the action happened.
    pub hour: Option<u8>,
    /// Rating submitted with the action.
    pub rating: Option<f64>,
    /// Age in years of the submitted item date.
    pub content_age_years: Option<i64>,
}

impl Signals {
    pub fn from_submission(now: OffsetDateTime, rating: Option<f64>, date: Option<Date>) -> Self {
        Self {
            hour: Some(now.hour()),
            rating,
            content_age_years: date.map(|d| (now.date() - d).whole_days() / 365),
        }
    }

    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            hour: Some(now.hour()),
            ..Default::default()
        }
    }
}

fn qualifies(rule: &BadgeRule, stats: &CollectionStats, signals: &Signals) -> bool {
    let counter = match rule.category {
        BadgeCategory::Total => stats.total,
        BadgeCategory::Movie => stats.movies,
        BadgeCategory::Series => stats.series,
        BadgeCategory::Book => stats.books,
        BadgeCategory::Game => stats.games,
        BadgeCategory::Following => stats.following,
        BadgeCategory::Followers => stats.followers,
        BadgeCategory::Genre => stats.genres,
        BadgeCategory::Platform => stats.platforms,
        BadgeCategory::Mood => stats.moods,
        BadgeCategory::Language => stats.languages,
        BadgeCategory::Notes => stats.noted,
        BadgeCategory::TimeOfDay => {
            return signals.hour.is_some_and(|h| u32::from(h) < rule.threshold)
        }
        BadgeCategory::Rating => {
            return signals.rating.is_some_and(|r| r >= f64::from(rule.threshold))
        }
        BadgeCategory::ContentAge => {
            return signals
                .content_age_years
                .is_some_and(|age| age >= i64::from(rule.threshold))
        }
    };
    counter >= rule.threshold
}

/// Every rule that qualifies and is not already unlocked.
pub fn evaluate(
    stats: &CollectionStats,
    signals: &Signals,
    unlocked: &HashSet<String>,
) -> Vec<&'static BadgeRule> {
    RULES
        .iter()
        .filter(|rule| !unlocked.contains(rule.id) && qualifies(rule, stats, signals))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::repo::DEFAULT_THUMBNAIL;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn item(media_type: &str, rating: Option<f64>, notes: &str) -> Media {
        Media {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "entry".into(),
            media_type: media_type.into(),
            genre: String::new(),
            language: "English".into(),
            platform: "Other".into(),
            mood: "other".into(),
            status: "plan".into(),
            rating,
            notes: notes.into(),
            date: None,
            thumbnail: DEFAULT_THUMBNAIL.into(),
            created_at: datetime!(2026-08-01 12:00 UTC),
            updated_at: datetime!(2026-08-01 12:00 UTC),
        }
    }

    fn ids(rules: &[&'static BadgeRule]) -> Vec<&'static str> {
        rules.iter().map(|r| r.id).collect()
    }

    #[test]
    fn five_movies_unlock_movie_buff_exactly_once() {
        let rows: Vec<Media> = (0..5).map(|_| item("movie", None, "")).collect();
        let stats = CollectionStats::from_media(&rows, 0, 0);
        assert_eq!(stats.movies, 5);
        assert_eq!(stats.total, 5);

        let new = evaluate(&stats, &Signals::default(), &HashSet::new());
        let new_ids = ids(&new);
        assert_eq!(new_ids.iter().filter(|id| **id == "movie_buff").count(), 1);
        assert!(new_ids.contains(&"first_steps"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let rows: Vec<Media> = (0..5).map(|_| item("movie", None, "")).collect();
        let stats = CollectionStats::from_media(&rows, 0, 0);

        let mut unlocked = HashSet::new();
        let first = evaluate(&stats, &Signals::default(), &unlocked);
        assert!(!first.is_empty());
        unlocked.extend(first.iter().map(|r| r.id.to_string()));

        let second = evaluate(&stats, &Signals::default(), &unlocked);
        assert!(second.is_empty());
    }

    #[test]
    fn below_threshold_awards_nothing() {
        let rows: Vec<Media> = (0..4).map(|_| item("movie", None, "")).collect();
        let stats = CollectionStats::from_media(&rows, 0, 0);
        let new = evaluate(&stats, &Signals::default(), &HashSet::new());
        assert!(!ids(&new).contains(&"movie_buff"));
    }

    #[test]
    fn follower_and_following_rules_use_their_own_counters() {
        let stats = CollectionStats {
            followers: 5,
            following: 1,
            ..Default::default()
        };
        let new_ids = ids(&evaluate(&stats, &Signals::default(), &HashSet::new()));
        assert!(new_ids.contains(&"rising_star"));
        assert!(new_ids.contains(&"friendly_follower"));
        assert!(!new_ids.contains(&"community_member"));
        assert!(!new_ids.contains(&"trendsetter"));
    }

    #[test]
    fn unfollow_keeps_earned_badges() {
        // Badges are never revoked: the unlocked set only filters, the
        // evaluator never returns removals.
        let stats = CollectionStats {
            following: 0,
            ..Default::default()
        };
        let unlocked: HashSet<String> = ["friendly_follower".to_string()].into();
        let new = evaluate(&stats, &Signals::default(), &unlocked);
        assert!(ids(&new).is_empty());
    }

    #[test]
    fn diversity_counters_ignore_blanks_and_duplicates() {
        let mut rows = vec![item("movie", None, ""), item("movie", None, "")];
        rows[0].genre = "Sci-Fi".into();
        rows[1].genre = "  Sci-Fi ".into();
        let stats = CollectionStats::from_media(&rows, 0, 0);
        assert_eq!(stats.genres, 1);
    }

    #[test]
    fn night_owl_fires_only_in_the_window() {
        let stats = CollectionStats::default();
        let late = Signals {
            hour: Some(3),
            ..Default::default()
        };
        assert!(ids(&evaluate(&stats, &late, &HashSet::new())).contains(&"night_owl"));

        let morning = Signals {
            hour: Some(9),
            ..Default::default()
        };
        assert!(!ids(&evaluate(&stats, &morning, &HashSet::new())).contains(&"night_owl"));

        let absent = Signals::default();
        assert!(!ids(&evaluate(&stats, &absent, &HashSet::new())).contains(&"night_owl"));
    }

    #[test]
    fn perfect_ten_requires_the_full_score() {
        let stats = CollectionStats::default();
        let ten = Signals {
            rating: Some(10.0),
            ..Default::default()
        };
        assert!(ids(&evaluate(&stats, &ten, &HashSet::new())).contains(&"perfect_ten"));

        let nine = Signals {
            rating: Some(9.5),
            ..Default::default()
        };
        assert!(!ids(&evaluate(&stats, &nine, &HashSet::new())).contains(&"perfect_ten"));
    }

    #[test]
    fn content_age_signal_comes_from_the_item_date() {
        let now = datetime!(2026-08-07 10:00 UTC);
        let old = Signals::from_submission(now, None, Some(date!(1994 - 06 - 01)));
        assert!(old.content_age_years.unwrap() >= 25);
        let stats = CollectionStats::default();
        assert!(ids(&evaluate(&stats, &old, &HashSet::new())).contains(&"time_traveler"));

        let recent = Signals::from_submission(now, None, Some(date!(2020 - 06 - 01)));
        assert!(!ids(&evaluate(&stats, &recent, &HashSet::new())).contains(&"time_traveler"));
    }

    #[test]
    fn noted_counter_counts_non_blank_notes() {
        let rows = vec![
            item("movie", None, "great"),
            item("movie", None, "   "),
            item("movie", None, ""),
        ];
        let stats = CollectionStats::from_media(&rows, 0, 0);
        assert_eq!(stats.noted, 1);
    }
}
