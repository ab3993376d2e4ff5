use serde::Serialize;

/// What a rule's threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// Total media entries.
    Total,
    /// Entries of a single type.
    Movie,
    Series,
    Book,
    Game,
    /// Accounts the user follows.
    Following,
    /// Accounts following the user.
    Followers,
    /// Distinct non-empty values across the collection.
    Genre,
    Platform,
    Mood,
    Language,
    /// Entries carrying non-blank notes.
    Notes,
    /// The triggering action happened before this hour of the day.
    TimeOfDay,
    /// A just-submitted rating at or above the threshold.
    Rating,
    /// A just-submitted item dated at least this many years back.
    ContentAge,
}

#[derive(Debug, Serialize)]
pub struct BadgeRule {
    pub id: &'static str,
    pub category: BadgeCategory,
    pub threshold: u32,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

macro_rules! rule {
    ($id:literal, $category:ident, $threshold:literal, $name:literal, $icon:literal, $desc:literal) => {
        BadgeRule {
            id: $id,
            category: BadgeCategory::$category,
            threshold: $threshold,
            name: $name,
            icon: $icon,
            description: $desc,
        }
    };
}

/// The full badge table. Rules ship with the binary; unlocks are the
/// only persisted state.
pub static RULES: &[BadgeRule] = &[
    // Collection size
    rule!("first_steps", Total, 1, "First Steps", "🌱", "Add your first media entry"),
    rule!("collector", Total, 10, "Collector", "📦", "Track 10 media entries"),
    rule!("curator", Total, 25, "Curator", "🗂️", "Track 25 media entries"),
    rule!("archivist", Total, 50, "Archivist", "🏛️", "Track 50 media entries"),
    rule!("century_club", Total, 100, "Century Club", "💯", "Track 100 media entries"),
    // Per type
    rule!("movie_buff", Movie, 5, "Movie Buff", "🎬", "Track 5 movies"),
    rule!("cinephile", Movie, 20, "Cinephile", "🎥", "Track 20 movies"),
    rule!("binge_watcher", Series, 5, "Binge Watcher", "📺", "Track 5 series"),
    rule!("series_marathoner", Series, 20, "Series Marathoner", "🛋️", "Track 20 series"),
    rule!("bookworm", Book, 5, "Bookworm", "🐛", "Track 5 books"),
    rule!("bibliophile", Book, 20, "Bibliophile", "📖", "Track 20 books"),
    rule!("casual_gamer", Game, 5, "Casual Gamer", "🎮", "Track 5 games"),
    rule!("completionist", Game, 20, "Completionist", "🏆", "Track 20 games"),
    // Social
    rule!("friendly_follower", Following, 1, "Friendly Follower", "🤝", "Follow your first user"),
    rule!("community_member", Following, 5, "Community Member", "🏘️", "Follow 5 users"),
    rule!("social_explorer", Following, 10, "Social Explorer", "🧭", "Follow 10 users"),
    rule!("rising_star", Followers, 5, "Rising Star", "⭐", "Reach 5 followers"),
    rule!("trendsetter", Followers, 15, "Trendsetter", "🔥", "Reach 15 followers"),
    rule!("influencer", Followers, 30, "Influencer", "👑", "Reach 30 followers"),
    // Diversity
    rule!("genre_hopper", Genre, 5, "Genre Hopper", "🎭", "Track entries across 5 genres"),
    rule!("platform_surfer", Platform, 5, "Platform Surfer", "🏄", "Use 5 different platforms"),
    rule!("mood_ring", Mood, 8, "Mood Ring", "💍", "Log entries in 8 different moods"),
    rule!("polyglot", Language, 3, "Polyglot", "🌍", "Track media in 3 languages"),
    // Habits
    rule!("note_taker", Notes, 10, "Note Taker", "📝", "Write notes on 10 entries"),
    rule!("night_owl", TimeOfDay, 5, "Night Owl", "🦉", "Log an entry before 5 AM"),
    rule!("perfect_ten", Rating, 10, "Perfect Ten", "🔟", "Rate something a flawless 10"),
    rule!("time_traveler", ContentAge, 25, "Time Traveler", "⏳", "Log something 25+ years old"),
];

pub fn find(id: &str) -> Option<&'static BadgeRule> {
    RULES.iter().find(|rule| rule.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rule_ids_are_unique() {
        let ids: HashSet<&str> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), RULES.len());
    }

    #[test]
    fn find_resolves_known_ids() {
        assert!(find("friendly_follower").is_some());
        assert!(find("no_such_badge").is_none());
    }

    #[test]
    fn serializes_with_category_key() {
        let json = serde_json::to_value(find("night_owl").unwrap()).unwrap();
        assert_eq!(json["category"], "time_of_day");
        assert_eq!(json["threshold"], 5);
    }
}
