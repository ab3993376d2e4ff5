use serde::{Deserialize, Serialize};
use time::Date;

use crate::badges::rules::BadgeRule;
use crate::error::{ApiError, ApiResult};
use crate::media::repo::{Media, MediaValues, DEFAULT_THUMBNAIL};

pub const MEDIA_TYPES: &[&str] = &["movie", "series", "anime", "book", "game", "other"];
pub const STATUSES: &[&str] = &["plan", "watching", "completed", "on-hold", "dropped"];

#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    pub title: String,
    pub media_type: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub mood: Option<String>,
    pub status: Option<String>,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    pub date: Option<Date>,
    pub thumbnail: Option<String>,
}

/// Partial update. Missing fields keep their value; `rating` and `date`
/// use a double `Option` so an explicit JSON `null` clears the column.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMediaRequest {
    pub title: Option<String>,
    pub media_type: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub mood: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub rating: Option<Option<f64>>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<Date>>,
    pub thumbnail: Option<String>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Response for media create/update: the row plus any badges the
/// mutation unlocked, for toast display.
#[derive(Debug, Serialize)]
pub struct MediaMutationResponse {
    pub media: Media,
    pub new_badges: Vec<&'static BadgeRule>,
}

fn check_rating(rating: Option<f64>) -> ApiResult<Option<f64>> {
    match rating {
        Some(r) if !(0.0..=10.0).contains(&r) => {
            Err(ApiError::validation("Rating must be between 0 and 10"))
        }
        other => Ok(other),
    }
}

fn check_media_type(media_type: &str) -> ApiResult<()> {
    if MEDIA_TYPES.contains(&media_type) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Unknown media type '{media_type}'"
        )))
    }
}

fn check_status(status: &str) -> ApiResult<()> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Unknown status '{status}'")))
    }
}

impl CreateMediaRequest {
    /// Normalize and validate into column values.
    pub fn into_values(self) -> ApiResult<MediaValues> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::validation("Title is required"));
        }
        let media_type = self
            .media_type
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "movie".into());
        check_media_type(&media_type)?;
        let status = self
            .status
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "plan".into());
        check_status(&status)?;
        let rating = check_rating(self.rating)?;

        Ok(MediaValues {
            title,
            media_type,
            genre: self.genre.map(|g| g.trim().to_string()).unwrap_or_default(),
            language: self
                .language
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "English".into()),
            platform: self
                .platform
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "Other".into()),
            mood: self
                .mood
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "other".into()),
            status,
            rating,
            notes: self.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
            date: self.date,
            thumbnail: self
                .thumbnail
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_THUMBNAIL.into()),
        })
    }
}

impl UpdateMediaRequest {
    /// Merge the patch over the existing row, validating the result.
    /// Ownership (`user_id`) is never part of the patch.
    pub fn merge_into(self, existing: &Media) -> ApiResult<MediaValues> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| existing.title.clone());
        if title.is_empty() {
            return Err(ApiError::validation("Title is required"));
        }
        let media_type = self
            .media_type
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_else(|| existing.media_type.clone());
        check_media_type(&media_type)?;
        let status = self
            .status
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| existing.status.clone());
        check_status(&status)?;
        let rating = check_rating(self.rating.unwrap_or(existing.rating))?;

        Ok(MediaValues {
            title,
            media_type,
            genre: self
                .genre
                .map(|g| g.trim().to_string())
                .unwrap_or_else(|| existing.genre.clone()),
            language: self
                .language
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| existing.language.clone()),
            platform: self
                .platform
                .map(|p| p.trim().to_string())
                .unwrap_or_else(|| existing.platform.clone()),
            mood: self
                .mood
                .map(|m| m.trim().to_lowercase())
                .unwrap_or_else(|| existing.mood.clone()),
            status,
            rating,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| existing.notes.clone()),
            date: self.date.unwrap_or(existing.date),
            thumbnail: self
                .thumbnail
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| existing.thumbnail.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn request(title: &str) -> CreateMediaRequest {
        CreateMediaRequest {
            title: title.into(),
            media_type: None,
            genre: None,
            language: None,
            platform: None,
            mood: None,
            status: None,
            rating: None,
            notes: None,
            date: None,
            thumbnail: None,
        }
    }

    fn existing() -> Media {
        Media {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Dune".into(),
            media_type: "movie".into(),
            genre: "Sci-Fi".into(),
            language: "English".into(),
            platform: "Movie Theatre".into(),
            mood: "epic".into(),
            status: "completed".into(),
            rating: Some(9.0),
            notes: "rewatch someday".into(),
            date: None,
            thumbnail: DEFAULT_THUMBNAIL.into(),
            created_at: datetime!(2026-01-01 00:00 UTC),
            updated_at: datetime!(2026-01-01 00:00 UTC),
        }
    }

    #[test]
    fn create_fills_defaults() {
        let values = request("  Dune  ").into_values().unwrap();
        assert_eq!(values.title, "Dune");
        assert_eq!(values.media_type, "movie");
        assert_eq!(values.status, "plan");
        assert_eq!(values.language, "English");
        assert_eq!(values.platform, "Other");
        assert_eq!(values.mood, "other");
        assert_eq!(values.thumbnail, DEFAULT_THUMBNAIL);
    }

    #[test]
    fn create_rejects_blank_title() {
        assert!(request("   ").into_values().is_err());
    }

    #[test]
    fn create_rejects_out_of_range_rating() {
        let mut req = request("Dune");
        req.rating = Some(11.0);
        assert!(req.into_values().is_err());
        let mut req = request("Dune");
        req.rating = Some(-0.5);
        assert!(req.into_values().is_err());
    }

    #[test]
    fn create_rejects_unknown_type() {
        let mut req = request("Dune");
        req.media_type = Some("podcast".into());
        assert!(req.into_values().is_err());
    }

    #[test]
    fn update_merge_keeps_missing_fields() {
        let patch = UpdateMediaRequest {
            status: Some("watching".into()),
            ..Default::default()
        };
        let values = patch.merge_into(&existing()).unwrap();
        assert_eq!(values.status, "watching");
        assert_eq!(values.title, "Dune");
        assert_eq!(values.rating, Some(9.0));
    }

    #[test]
    fn update_null_rating_clears_it() {
        let patch: UpdateMediaRequest =
            serde_json::from_str(r#"{ "rating": null }"#).unwrap();
        let values = patch.merge_into(&existing()).unwrap();
        assert_eq!(values.rating, None);
    }

    #[test]
    fn update_missing_rating_keeps_it() {
        let patch: UpdateMediaRequest = serde_json::from_str(r#"{}"#).unwrap();
        let values = patch.merge_into(&existing()).unwrap();
        assert_eq!(values.rating, Some(9.0));
    }
}
