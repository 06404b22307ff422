use sweep_core::infrastructure::InMemoryContentSource;
use sweep_model::{ContentKind, ContentType, ContentTypeInfo, ItemStatus};

/// `(type, status, count)` rows inserted by [`seed_demo_content`].
const DEMO_ITEMS: &[(&str, ItemStatus, usize)] = &[
    ("post", ItemStatus::Publish, 120),
    ("post", ItemStatus::Draft, 14),
    ("post", ItemStatus::Private, 3),
    ("page", ItemStatus::Publish, 18),
    ("page", ItemStatus::Pending, 2),
    ("attachment", ItemStatus::Inherit, 45),
    ("product", ItemStatus::Publish, 30),
    ("product", ItemStatus::Trash, 4),
    ("revision", ItemStatus::Inherit, 25),
];

/// Fills an in-memory store with a small mixed catalogue. Returns the
/// number of items inserted.
pub async fn seed_demo_content(content: &InMemoryContentSource) -> usize {
    for (name, label, kind, public) in [
        ("product", "Product", ContentKind::Ordinary, true),
        ("revision", "Revision", ContentKind::Ordinary, false),
    ] {
        if let Ok(name) = ContentType::parse(name) {
            content
                .register_type(ContentTypeInfo::new(name, label, kind, public))
                .await;
        }
    }

    let mut inserted = 0;
    for (name, status, count) in DEMO_ITEMS {
        if let Ok(content_type) = ContentType::parse(name) {
            inserted += content
                .insert_many(&content_type, *status, *count)
                .await
                .len();
        }
    }
    inserted
}
