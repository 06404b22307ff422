use std::collections::BTreeSet;

use sweep_model::{ContentType, ContentTypeInfo, ItemStatus};
use tracing::warn;

use crate::error::{Result, SweepError};

/// Which items a scan counts and visits.
///
/// Each selected content type carries the one status that makes its items
/// eligible (`publish` for ordinary types, `inherit` for attachments). An item
/// matches when the pair `(type, status)` is one of the entries, so an
/// attachment is never picked up for being `publish` and a post is never
/// picked up for being `inherit`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EligibilityRule {
    entries: Vec<(ContentType, ItemStatus)>,
}

impl EligibilityRule {
    pub fn for_types(types: &[ContentTypeInfo]) -> Self {
        let mut entries: Vec<(ContentType, ItemStatus)> = Vec::new();
        for info in types {
            if entries.iter().any(|(name, _)| name == &info.name) {
                continue;
            }
            entries.push((info.name.clone(), info.eligible_status()));
        }
        Self { entries }
    }

    pub fn single(info: &ContentTypeInfo) -> Self {
        Self::for_types(std::slice::from_ref(info))
    }

    pub fn entries(&self) -> &[(ContentType, ItemStatus)] {
        &self.entries
    }

    pub fn matches(&self, content_type: &ContentType, status: ItemStatus) -> bool {
        self.entries
            .iter()
            .any(|(name, eligible)| name == content_type && *eligible == status)
    }

    /// Union of eligible statuses across all entries.
    pub fn statuses(&self) -> Vec<ItemStatus> {
        self.entries
            .iter()
            .map(|(_, status)| *status)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn types(&self) -> Vec<ContentType> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Requested content types split into the ones the store knows and the ones
/// it does not.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TypeSelection {
    pub selected: Vec<ContentTypeInfo>,
    pub ignored: Vec<String>,
}

impl TypeSelection {
    pub fn names(&self) -> Vec<ContentType> {
        self.selected.iter().map(|info| info.name.clone()).collect()
    }

    pub fn rule(&self) -> EligibilityRule {
        EligibilityRule::for_types(&self.selected)
    }
}

/// Resolves raw requested names against the known content types.
///
/// Duplicates collapse onto their first occurrence. Unknown or malformed
/// names are dropped with a warning; an empty request, or one where nothing
/// survives, is rejected.
pub fn select_types<S: AsRef<str>>(
    requested: &[S],
    known: &[ContentTypeInfo],
) -> Result<TypeSelection> {
    if requested.iter().all(|raw| raw.as_ref().trim().is_empty()) {
        return Err(SweepError::InvalidInput(
            "No content types selected".to_string(),
        ));
    }

    let mut selection = TypeSelection::default();
    for raw in requested {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }
        let found = ContentType::parse(raw)
            .ok()
            .and_then(|name| known.iter().find(|info| info.name == name));
        match found {
            Some(info) => {
                if !selection.selected.iter().any(|s| s.name == info.name) {
                    selection.selected.push(info.clone());
                }
            }
            None => {
                warn!(content_type = raw, "content type does not exist, skipping");
                if !selection.ignored.iter().any(|i| i == raw) {
                    selection.ignored.push(raw.to_string());
                }
            }
        }
    }

    if selection.selected.is_empty() {
        return Err(SweepError::InvalidInput(
            "No valid content types selected".to_string(),
        ));
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_model::ContentKind;

    fn known() -> Vec<ContentTypeInfo> {
        vec![
            info("post", ContentKind::Ordinary),
            info("page", ContentKind::Ordinary),
            info("attachment", ContentKind::Attachment),
        ]
    }

    fn info(name: &str, kind: ContentKind) -> ContentTypeInfo {
        ContentTypeInfo::new(ContentType::parse(name).unwrap(), name, kind, true)
    }

    fn ct(name: &str) -> ContentType {
        ContentType::parse(name).unwrap()
    }

    #[test]
    fn rule_pairs_each_type_with_its_own_status() {
        let rule = EligibilityRule::for_types(&known());
        assert!(rule.matches(&ct("post"), ItemStatus::Publish));
        assert!(rule.matches(&ct("attachment"), ItemStatus::Inherit));
        assert!(!rule.matches(&ct("post"), ItemStatus::Inherit));
        assert!(!rule.matches(&ct("attachment"), ItemStatus::Publish));
        assert!(!rule.matches(&ct("page"), ItemStatus::Draft));
        assert_eq!(
            rule.statuses(),
            vec![ItemStatus::Publish, ItemStatus::Inherit]
        );
    }

    #[test]
    fn selection_keeps_order_and_drops_duplicates() {
        let selection =
            select_types(&["page", "post", "PAGE"], &known()).unwrap();
        assert_eq!(selection.names(), vec![ct("page"), ct("post")]);
        assert!(selection.ignored.is_empty());
    }

    #[test]
    fn selection_filters_unknown_types() {
        let selection =
            select_types(&["post", "bogus", "no spaces"], &known()).unwrap();
        assert_eq!(selection.names(), vec![ct("post")]);
        assert_eq!(selection.ignored, vec!["bogus", "no spaces"]);
    }

    #[test]
    fn selection_rejects_empty_and_all_invalid() {
        let empty: [&str; 0] = [];
        let err = select_types(&empty, &known()).unwrap_err();
        assert!(matches!(err, SweepError::InvalidInput(ref m) if m == "No content types selected"));

        let err = select_types(&["bogus"], &known()).unwrap_err();
        assert!(matches!(err, SweepError::InvalidInput(ref m) if m == "No valid content types selected"));
    }
}
