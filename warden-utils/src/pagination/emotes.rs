use poise::serenity_prelude as serenity;

pub const FIRST_EMOTE: &str = "⏮️";
pub const PREVIOUS_EMOTE: &str = "◀️";
pub const NEXT_EMOTE: &str = "▶️";
pub const LAST_EMOTE: &str = "⏭️";
pub const STOP_EMOTE: &str = "⏹️";

const VARIATION_SELECTOR: char = '\u{FE0F}';

/// What a reaction asks the paginator to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
    Stop,
}

impl Navigation {
    /// Apply this step to a zero-based page index over `total_pages` pages.
    pub fn apply(self, current: usize, total_pages: usize) -> usize {
        let last = total_pages.saturating_sub(1);
        match self {
            Self::First => 0,
            Self::Previous => current.saturating_sub(1).min(last),
            Self::Next => current.saturating_add(1).min(last),
            Self::Last => last,
            Self::Stop => current.min(last),
        }
    }
}

pub fn unicode(emoji: &str) -> serenity::ReactionType {
    serenity::ReactionType::Unicode(emoji.to_owned())
}

/// Compare two reactions the way Discord reports them.
///
/// Unicode emoji arrive with or without the trailing variation selector
/// depending on the client, custom emoji are compared by id only.
pub fn same_emote(left: &serenity::ReactionType, right: &serenity::ReactionType) -> bool {
    match (left, right) {
        (serenity::ReactionType::Unicode(left), serenity::ReactionType::Unicode(right)) => {
            left.trim_end_matches(VARIATION_SELECTOR) == right.trim_end_matches(VARIATION_SELECTOR)
        }
        (
            serenity::ReactionType::Custom { id: left, .. },
            serenity::ReactionType::Custom { id: right, .. },
        ) => left == right,
        _ => left == right,
    }
}

/// Ordered, fixed set of reactions a paginator listens to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmoteSet {
    bindings: Vec<(serenity::ReactionType, Navigation)>,
}

impl EmoteSet {
    /// Build a set from `(emote, navigation)` pairs. Later duplicates of an
    /// emote already bound are dropped.
    pub fn new(bindings: impl IntoIterator<Item = (serenity::ReactionType, Navigation)>) -> Self {
        let mut unique: Vec<(serenity::ReactionType, Navigation)> = Vec::new();
        for (emote, navigation) in bindings {
            if unique.iter().any(|(bound, _)| same_emote(bound, &emote)) {
                continue;
            }
            unique.push((emote, navigation));
        }

        Self { bindings: unique }
    }

    /// First, previous, next, last and stop.
    pub fn standard() -> Self {
        Self::new([
            (unicode(FIRST_EMOTE), Navigation::First),
            (unicode(PREVIOUS_EMOTE), Navigation::Previous),
            (unicode(NEXT_EMOTE), Navigation::Next),
            (unicode(LAST_EMOTE), Navigation::Last),
            (unicode(STOP_EMOTE), Navigation::Stop),
        ])
    }

    /// Previous and next only.
    pub fn arrows() -> Self {
        Self::new([
            (unicode(PREVIOUS_EMOTE), Navigation::Previous),
            (unicode(NEXT_EMOTE), Navigation::Next),
        ])
    }

    pub fn navigation_for(&self, emote: &serenity::ReactionType) -> Option<Navigation> {
        self.bindings
            .iter()
            .find(|(bound, _)| same_emote(bound, emote))
            .map(|(_, navigation)| *navigation)
    }

    pub fn contains(&self, emote: &serenity::ReactionType) -> bool {
        self.navigation_for(emote).is_some()
    }

    pub fn emotes(&self) -> impl Iterator<Item = &serenity::ReactionType> {
        self.bindings.iter().map(|(emote, _)| emote)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{EmoteSet, NEXT_EMOTE, Navigation, PREVIOUS_EMOTE, STOP_EMOTE, same_emote, unicode};

    #[test]
    fn navigation_stays_in_bounds() {
        assert_eq!(Navigation::Next.apply(0, 3), 1);
        assert_eq!(Navigation::Next.apply(2, 3), 2);
        assert_eq!(Navigation::Previous.apply(0, 3), 0);
        assert_eq!(Navigation::Previous.apply(2, 3), 1);
        assert_eq!(Navigation::First.apply(2, 3), 0);
        assert_eq!(Navigation::Last.apply(0, 3), 2);
        assert_eq!(Navigation::Stop.apply(1, 3), 1);
        assert_eq!(Navigation::Next.apply(0, 0), 0);
    }

    #[test]
    fn unicode_matching_ignores_variation_selector() {
        assert!(same_emote(&unicode("▶️"), &unicode("▶")));
        assert!(!same_emote(&unicode("▶️"), &unicode("◀️")));
    }

    #[test]
    fn custom_emotes_match_by_id() {
        let left = serenity::ReactionType::Custom {
            animated: false,
            id: serenity::EmojiId::new(42),
            name: Some("next".to_owned()),
        };
        let right = serenity::ReactionType::Custom {
            animated: true,
            id: serenity::EmojiId::new(42),
            name: None,
        };
        assert!(same_emote(&left, &right));
    }

    #[test]
    fn sets_resolve_navigation_and_drop_duplicates() {
        let set = EmoteSet::new([
            (unicode(PREVIOUS_EMOTE), Navigation::Previous),
            (unicode(NEXT_EMOTE), Navigation::Next),
            (unicode("▶"), Navigation::Last),
        ]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.navigation_for(&unicode("▶")), Some(Navigation::Next));
        assert!(!set.contains(&unicode(STOP_EMOTE)));
        assert_eq!(EmoteSet::standard().len(), 5);
        assert_eq!(
            EmoteSet::arrows().emotes().cloned().collect::<Vec<_>>(),
            vec![unicode(PREVIOUS_EMOTE), unicode(NEXT_EMOTE)]
        );
    }
}
