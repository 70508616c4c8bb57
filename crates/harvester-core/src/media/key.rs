//! Deterministic object-storage key composition, so re-running ingest for
//! the same media asset always resolves to the same key (idempotent
//! re-upload, cheap existence checks before downloading again).

use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
    Profile,
}

impl MediaClass {
    fn dir_name(&self) -> &'static str {
        match self {
            MediaClass::Image => "images",
            MediaClass::Video => "videos",
            MediaClass::Profile => "profile",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            MediaClass::Image | MediaClass::Profile => "jpg",
            MediaClass::Video => "mp4",
        }
    }

    /// `ContentType` set on the `PutObject` call, pub fn content_type(&self) -> &'static str {
        match self {
            MediaClass::Image | MediaClass::Profile => "image/jpeg",
            MediaClass::Video => "video/mp4",
        }
    }
}

/// Build a key of the form `{class}/{YYYY}/{MM}/{creator_id}/{media_pk}[_{index}].{ext}`.
pub fn media_key(class: MediaClass, creator_id: &str, media_pk: &str, index: Option<u32>) -> String {
    let now = Utc::now();
    let suffix = index.map(|i| format!("_{i}")).unwrap_or_default();
    format!(
        "{}/{:04}/{:02}/{}/{}{}.{}",
        class.dir_name(),
        now.format("%Y"),
        now.format("%m"),
        creator_id,
        media_pk,
        suffix,
        class.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_expected_segments() {
        let key = media_key(MediaClass::Image, "creator1", "media1", None);
        assert!(key.starts_with("images/"));
        assert!(key.ends_with("/creator1/media1.jpg"));
    }

    #[test]
    fn index_is_appended_before_extension() {
        let key = media_key(MediaClass::Video, "creator1", "media1", Some(2));
        assert!(key.ends_with("/creator1/media1_2.mp4"));
    }

    #[test]
    fn profile_pictures_get_their_own_directory_and_jpg_extension() {
        let key = media_key(MediaClass::Profile, "creator1", "pic", None);
        assert!(key.starts_with("profile/"));
        assert!(key.ends_with("/creator1/pic.jpg"));
    }

    #[test]
    fn content_type_matches_class() {
        assert_eq!(MediaClass::Image.content_type(), "image/jpeg");
        assert_eq!(MediaClass::Profile.content_type(), "image/jpeg");
        assert_eq!(MediaClass::Video.content_type(), "video/mp4");
    }
}
