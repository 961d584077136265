//! Sample sermons and render data.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;

use crate::models::{
    Attachment, BiblePassage, EntityRef, PassageRange, Preacher, RenderData, Sermon, SermonLink,
    SermonNavigation,
};

/// Sermon 1, "Amazing Grace": preacher, series, one passage, an audio file,
/// an external link and an embed.
pub fn grace_sermon() -> Sermon {
    Sermon {
        id: 1,
        title: "Amazing Grace".to_string(),
        description: "Saved by grace\nthrough faith".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 10).and_then(|d| d.and_hms_opt(10, 30, 0)),
        preacher: Some(Preacher {
            id: 7,
            name: "Ann Lee".to_string(),
            description: "Senior pastor".to_string(),
            image: Some("ann.jpg".to_string()),
        }),
        series: Some(EntityRef::new(3, "Ephesians")),
        service: Some(EntityRef::new(2, "Morning")),
        passages: vec![PassageRange::new(
            BiblePassage::new("Ephesians", 2, 1),
            BiblePassage::new("Ephesians", 2, 10),
        )],
        attachments: vec![
            Attachment::file("2024/grace.mp3"),
            Attachment::url("https://cdn.example/grace-notes.pdf"),
            Attachment::code(STANDARD.encode(r#"<iframe src="https://video.example/1"></iframe>"#)),
        ],
        tags: vec!["grace".to_string(), "faith".to_string()],
    }
}

/// Sermon 2, "Living Hope": minimal record with one passage.
pub fn hope_sermon() -> Sermon {
    Sermon {
        id: 2,
        title: "Living Hope".to_string(),
        passages: vec![PassageRange::new(
            BiblePassage::new("1 Peter", 1, 3),
            BiblePassage::new("1 Peter", 1, 9),
        )],
        ..Sermon::default()
    }
}

/// Detail page data for [`grace_sermon`] with neighbour links.
pub fn single_page() -> RenderData {
    RenderData {
        navigation: SermonNavigation {
            previous: None,
            next: Some(SermonLink {
                id: 2,
                title: "Living Hope".to_string(),
            }),
            same_day: Vec::new(),
        },
        ..RenderData::single(grace_sermon())
    }
}

/// Listing data with both sample sermons.
pub fn search_page() -> RenderData {
    RenderData {
        tags: vec!["grace".to_string(), "faith".to_string(), "grace".to_string()],
        ..RenderData::search(vec![grace_sermon(), hope_sermon()])
    }
}
