//! Dashboard analytics. Everything is recomputed per request from the
//! caller's media rows; collections are small enough that independent
//! grouping passes beat bookkeeping incremental state.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::media::repo::Media;

/// How many months the activity chart looks back, current month included.
pub const TRAILING_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAverage {
    pub name: String,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct StatsOverview {
    pub total: u32,
    pub avg_rating: f64,
    pub this_month: u32,
    pub genre_count: u32,
    pub platform_count: u32,
    pub language_count: u32,
    pub type_count: Vec<GroupCount>,
    pub top_genres: Vec<GroupCount>,
    pub mood_count: Vec<GroupCount>,
    pub status_count: Vec<GroupCount>,
    pub monthly: Vec<MonthlyCount>,
    pub avg_rating_by_type: Vec<TypeAverage>,
}

/// Arithmetic mean of the non-null ratings; 0 when none exist.
pub fn average_rating(rows: &[Media]) -> f64 {
    let rated: Vec<f64> = rows.iter().filter_map(|m| m.rating).collect();
    if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    }
}

/// Most frequent media type across the collection, if any. Ties break
/// alphabetically so the result is stable.
pub fn favorite_type(rows: &[Media]) -> Option<String> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.media_type.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(name, _)| name.to_string())
}

fn month_key(year: i32, month: u8) -> String {
    format!("{year:04}-{month:02}")
}

fn key_of(date: Date) -> String {
    month_key(date.year(), u8::from(date.month()))
}

fn previous_month(year: i32, month: u8) -> (i32, u8) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// `TRAILING_MONTHS` month keys ending at `now`'s month, ascending.
fn trailing_month_keys(now: OffsetDateTime) -> Vec<String> {
    let mut year = now.year();
    let mut month = u8::from(now.month());
    let mut keys = Vec::with_capacity(TRAILING_MONTHS);
    for _ in 0..TRAILING_MONTHS {
        keys.push(month_key(year, month));
        (year, month) = previous_month(year, month);
    }
    keys.reverse();
    keys
}

fn group_counts<'a, I>(values: I) -> BTreeMap<&'a str, u32>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
}

fn sorted_desc(counts: BTreeMap<&str, u32>) -> Vec<GroupCount> {
    let mut out: Vec<GroupCount> = counts
        .into_iter()
        .map(|(name, count)| GroupCount {
            name: name.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.name.cmp(&b.name)));
    out
}

fn distinct_non_empty<'a, I>(values: I) -> u32
where
    I: Iterator<Item = &'a str>,
{
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .len() as u32
}

pub fn overview(rows: &[Media], now: OffsetDateTime) -> StatsOverview {
    let avg_rating = average_rating(rows);

    let type_count = sorted_desc(group_counts(rows.iter().map(|m| m.media_type.as_str())));
    let status_count = sorted_desc(group_counts(rows.iter().map(|m| m.status.as_str())));
    let mood_count = sorted_desc(group_counts(
        rows.iter()
            .map(|m| m.mood.as_str())
            .filter(|m| !m.trim().is_empty()),
    ));

    let mut top_genres = sorted_desc(group_counts(
        rows.iter()
            .map(|m| m.genre.as_str())
            .filter(|g| !g.trim().is_empty()),
    ));
    let genre_count = top_genres.len() as u32;
    top_genres.truncate(6);

    // Month buckets over the item dates, zero-filled across the window.
    let keys = trailing_month_keys(now);
    let mut buckets: BTreeMap<&str, u32> = keys.iter().map(|k| (k.as_str(), 0)).collect();
    for row in rows {
        if let Some(date) = row.date {
            let key = key_of(date);
            if let Some(count) = buckets.get_mut(key.as_str()) {
                *count += 1;
            }
        }
    }
    let monthly: Vec<MonthlyCount> = keys
        .iter()
        .map(|k| MonthlyCount {
            month: k.clone(),
            count: buckets[k.as_str()],
        })
        .collect();
    let this_month = monthly.last().map(|m| m.count).unwrap_or(0);

    // Per-type rating averages over rated entries only.
    let mut per_type: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    for row in rows {
        if let Some(rating) = row.rating {
            let entry = per_type.entry(row.media_type.as_str()).or_insert((0.0, 0));
            entry.0 += rating;
            entry.1 += 1;
        }
    }
    let mut avg_rating_by_type: Vec<TypeAverage> = per_type
        .into_iter()
        .map(|(name, (sum, n))| TypeAverage {
            name: name.to_string(),
            average: sum / n as f64,
        })
        .collect();
    avg_rating_by_type.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.name.cmp(&b.name))
    });

    StatsOverview {
        total: rows.len() as u32,
        avg_rating,
        this_month,
        genre_count,
        platform_count: distinct_non_empty(rows.iter().map(|m| m.platform.as_str())),
        language_count: distinct_non_empty(rows.iter().map(|m| m.language.as_str())),
        type_count,
        top_genres,
        mood_count,
        status_count,
        monthly,
        avg_rating_by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::repo::DEFAULT_THUMBNAIL;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn item(media_type: &str, genre: &str, rating: Option<f64>, date: Option<Date>) -> Media {
        Media {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "entry".into(),
            media_type: media_type.into(),
            genre: genre.into(),
            language: "English".into(),
            platform: "Other".into(),
            mood: "other".into(),
            status: "completed".into(),
            rating,
            notes: String::new(),
            date,
            thumbnail: DEFAULT_THUMBNAIL.into(),
            created_at: datetime!(2026-08-01 12:00 UTC),
            updated_at: datetime!(2026-08-01 12:00 UTC),
        }
    }

    const NOW: OffsetDateTime = datetime!(2026-08-07 10:00 UTC);

    #[test]
    fn average_is_mean_of_rated_entries_only() {
        let rows = vec![
            item("movie", "", Some(8.0), None),
            item("movie", "", Some(6.0), None),
            item("book", "", None, None),
        ];
        assert_eq!(average_rating(&rows), 7.0);
    }

    #[test]
    fn average_is_zero_without_ratings() {
        let rows = vec![item("movie", "", None, None)];
        assert_eq!(average_rating(&rows), 0.0);
    }

    #[test]
    fn five_movies_group_as_expected() {
        let rows: Vec<Media> = (0..5).map(|_| item("movie", "", None, None)).collect();
        let stats = overview(&rows, NOW);
        assert_eq!(stats.total, 5);
        assert_eq!(
            stats.type_count,
            vec![GroupCount {
                name: "movie".into(),
                count: 5
            }]
        );
    }

    #[test]
    fn deleting_an_entry_drops_it_from_groupings() {
        let mut rows = vec![
            item("movie", "Sci-Fi", Some(9.0), None),
            item("book", "Sci-Fi", Some(5.0), None),
        ];
        let before = overview(&rows, NOW);
        assert_eq!(before.total, 2);
        rows.pop();
        let after = overview(&rows, NOW);
        assert_eq!(after.total, 1);
        assert_eq!(after.avg_rating, 9.0);
        assert_eq!(after.type_count.len(), 1);
    }

    #[test]
    fn monthly_window_is_zero_filled_and_bounded() {
        let rows = vec![
            item("movie", "", None, Some(date!(2026 - 08 - 02))),
            item("movie", "", None, Some(date!(2026 - 05 - 20))),
            item("movie", "", None, Some(date!(2026 - 01 - 10))), // before window
            item("movie", "", None, None),                        // undated
        ];
        let stats = overview(&rows, NOW);
        assert_eq!(stats.monthly.len(), TRAILING_MONTHS);
        assert_eq!(stats.monthly.first().unwrap().month, "2026-03");
        assert_eq!(stats.monthly.last().unwrap().month, "2026-08");
        assert_eq!(stats.this_month, 1);
        let may = stats.monthly.iter().find(|m| m.month == "2026-05").unwrap();
        assert_eq!(may.count, 1);
        let total_in_window: u32 = stats.monthly.iter().map(|m| m.count).sum();
        assert_eq!(total_in_window, 2);
    }

    #[test]
    fn window_crosses_year_boundary() {
        let now = datetime!(2026-02-15 08:00 UTC);
        let rows = vec![item("movie", "", None, Some(date!(2025 - 11 - 30)))];
        let stats = overview(&rows, now);
        assert_eq!(stats.monthly.first().unwrap().month, "2025-09");
        let nov = stats.monthly.iter().find(|m| m.month == "2025-11").unwrap();
        assert_eq!(nov.count, 1);
    }

    #[test]
    fn top_genres_skip_blanks_and_cap_at_six() {
        let mut rows: Vec<Media> = Vec::new();
        for genre in ["A", "B", "C", "D", "E", "F", "G", ""] {
            rows.push(item("movie", genre, None, None));
        }
        rows.push(item("movie", "A", None, None));
        let stats = overview(&rows, NOW);
        assert_eq!(stats.top_genres.len(), 6);
        assert_eq!(stats.top_genres[0].name, "A");
        assert_eq!(stats.top_genres[0].count, 2);
        assert_eq!(stats.genre_count, 7);
    }

    #[test]
    fn per_type_averages() {
        let rows = vec![
            item("movie", "", Some(10.0), None),
            item("movie", "", Some(6.0), None),
            item("book", "", Some(9.0), None),
            item("game", "", None, None),
        ];
        let stats = overview(&rows, NOW);
        assert_eq!(stats.avg_rating_by_type.len(), 2);
        assert_eq!(stats.avg_rating_by_type[0].name, "book");
        assert_eq!(stats.avg_rating_by_type[0].average, 9.0);
        assert_eq!(stats.avg_rating_by_type[1].name, "movie");
        assert_eq!(stats.avg_rating_by_type[1].average, 8.0);
    }

    #[test]
    fn favorite_type_prefers_most_frequent() {
        let rows = vec![
            item("movie", "", None, None),
            item("book", "", None, None),
            item("book", "", None, None),
        ];
        assert_eq!(favorite_type(&rows), Some("book".into()));
        assert_eq!(favorite_type(&[]), None);
    }
}
