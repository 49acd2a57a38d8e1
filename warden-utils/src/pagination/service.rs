use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::editor::{MessageEditor, PaginatedMessage};
use super::emotes::Navigation;
use super::paginator::Paginator;

/// Idle time after which a paginator stops listening for reactions.
pub const PAGINATION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 3);

/// A reaction added to a message, reduced to what pagination needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageReaction {
    pub message_id: serenity::MessageId,
    pub user_id: serenity::UserId,
    pub user_is_bot: bool,
    pub emote: serenity::ReactionType,
}

impl PageReaction {
    /// Returns `None` for reactions without a user (e.g. partial payloads).
    pub fn from_reaction(reaction: &serenity::Reaction) -> Option<Self> {
        let user_id = reaction.user_id?;
        Some(Self {
            message_id: reaction.message_id,
            user_id,
            user_is_bot: reaction
                .member
                .as_ref()
                .is_some_and(|member| member.user.bot),
            emote: reaction.emoji.clone(),
        })
    }
}

struct Entry {
    paginator: Arc<Paginator>,
    queue: mpsc::UnboundedSender<PageReaction>,
}

pub(crate) struct Registry {
    entries: DashMap<serenity::MessageId, Entry>,
    editor: Arc<dyn MessageEditor>,
    idle_timeout: Duration,
    current_user: OnceLock<serenity::UserId>,
}

impl Registry {
    /// Drop the entry for `paginator`'s message if it still holds this
    /// instance.
    pub(crate) fn remove(&self, paginator: &Paginator) -> bool {
        self.entries
            .remove_if(&paginator.message().message_id, |_, entry| {
                std::ptr::eq(Arc::as_ptr(&entry.paginator), paginator)
            })
            .is_some()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let remaining = self
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.paginator))
            .collect::<Vec<_>>();
        self.entries.clear();

        for paginator in remaining {
            paginator.dispose_blocking();
        }
    }
}

/// Registry of live paginators, keyed by message.
///
/// Reactions for one message are applied in the order they reach
/// [`PaginationService::handle_reaction`]; each paginator has its own queue
/// and worker task, so different messages make progress independently.
#[derive(Clone)]
pub struct PaginationService {
    registry: Arc<Registry>,
}

impl PaginationService {
    pub fn new(editor: Arc<dyn MessageEditor>) -> Self {
        Self::with_idle_timeout(editor, PAGINATION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(editor: Arc<dyn MessageEditor>, idle_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(Registry {
                entries: DashMap::new(),
                editor,
                idle_timeout,
                current_user: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Registry> {
        Arc::downgrade(&self.registry)
    }

    pub fn editor(&self) -> Arc<dyn MessageEditor> {
        Arc::clone(&self.registry.editor)
    }

    /// Remember the bot's own user so its reactions are never dispatched.
    pub fn set_current_user(&self, user_id: serenity::UserId) {
        let _ = self.registry.current_user.set(user_id);
    }

    pub fn get(&self, message_id: serenity::MessageId) -> Option<Arc<Paginator>> {
        self.registry
            .entries
            .get(&message_id)
            .map(|entry| Arc::clone(&entry.paginator))
    }

    pub fn len(&self) -> usize {
        self.registry.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.entries.is_empty()
    }

    /// Track `paginator` and start its worker.
    ///
    /// A paginator already registered for the same message is replaced and
    /// closed in the background.
    pub fn add_paginator(&self, paginator: Arc<Paginator>) {
        let message_id = paginator.message().message_id;
        let (queue, reactions) = mpsc::unbounded_channel();

        let worker = Worker {
            paginator: Arc::clone(&paginator),
            editor: Arc::clone(&self.registry.editor),
            idle_timeout: self.registry.idle_timeout,
        };

        let displaced = self.registry.entries.insert(
            message_id,
            Entry {
                paginator: Arc::clone(&paginator),
                queue,
            },
        );
        tokio::spawn(worker.run(reactions));

        let Some(displaced) = displaced else {
            debug!(message_id = message_id.get(), "paginator registered");
            return;
        };

        if Arc::ptr_eq(&displaced.paginator, &paginator) {
            debug!(message_id = message_id.get(), "paginator re-registered");
            return;
        }

        warn!(
            message_id = message_id.get(),
            "replacing paginator already registered for message"
        );
        tokio::spawn(async move { displaced.paginator.dispose().await });
    }

    /// Forget `paginator`. Missing entries are ignored.
    pub fn remove_paginator(&self, paginator: &Paginator) {
        if self.registry.remove(paginator) {
            debug!(
                message_id = paginator.message().message_id.get(),
                "paginator removed"
            );
        }
    }

    /// Queue a reaction for its paginator. Returns whether it was accepted.
    pub fn handle_reaction(&self, reaction: PageReaction) -> bool {
        if reaction.user_is_bot
            || self.registry.current_user.get() == Some(&reaction.user_id)
        {
            return false;
        }

        let Some(entry) = self.registry.entries.get(&reaction.message_id) else {
            return false;
        };

        let paginator = &entry.paginator;
        if paginator.is_closed() {
            return false;
        }

        if !paginator.accepts(reaction.user_id) || !paginator.emotes().contains(&reaction.emote) {
            self.discard_reaction(paginator.message(), reaction);
            return false;
        }

        entry.queue.send(reaction).is_ok()
    }

    /// Best-effort removal of a refused reaction so the counters on the
    /// message keep matching the navigation emotes.
    fn discard_reaction(&self, message: PaginatedMessage, reaction: PageReaction) {
        let editor = Arc::clone(&self.registry.editor);
        tokio::spawn(async move {
            if let Err(err) = editor
                .remove_reaction(message, &reaction.emote, reaction.user_id)
                .await
            {
                debug!(
                    ?err,
                    message_id = message.message_id.get(),
                    "failed to remove refused reaction"
                );
            }
        });
    }

    /// Dispose the paginator of a message that is gone or was cleared.
    pub async fn release(&self, message_id: serenity::MessageId) {
        if let Some(paginator) = self.get(message_id) {
            paginator.dispose().await;
        }
    }

    /// Dispose every live paginator.
    pub async fn shutdown(&self) {
        let live = self
            .registry
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.paginator))
            .collect::<Vec<_>>();

        for paginator in live {
            paginator.dispose().await;
        }
    }
}

impl fmt::Debug for PaginationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationService")
            .field("live", &self.len())
            .field("idle_timeout", &self.registry.idle_timeout)
            .finish_non_exhaustive()
    }
}

struct Worker {
    paginator: Arc<Paginator>,
    editor: Arc<dyn MessageEditor>,
    idle_timeout: Duration,
}

impl Worker {
    async fn run(self, mut reactions: mpsc::UnboundedReceiver<PageReaction>) {
        loop {
            match tokio::time::timeout(self.idle_timeout, reactions.recv()).await {
                Ok(Some(reaction)) => self.apply(reaction).await,
                Ok(None) => break,
                Err(_) => {
                    debug!(
                        message_id = self.paginator.message().message_id.get(),
                        "paginator idle; disposing"
                    );
                    self.paginator.dispose().await;
                    break;
                }
            }
        }
    }

    async fn apply(&self, reaction: PageReaction) {
        if self.paginator.emotes().navigation_for(&reaction.emote) == Some(Navigation::Stop) {
            self.paginator.dispose().await;
            return;
        }

        self.paginator
            .turn_page(self.editor.as_ref(), reaction.user_id, &reaction.emote)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use poise::serenity_prelude as serenity;
    use tokio::sync::Notify;

    use super::{PageReaction, PaginationService};
    use crate::pagination::editor::{MessageEditor, PaginatedMessage};
    use crate::pagination::emotes::{
        EmoteSet, NEXT_EMOTE, Navigation, PREVIOUS_EMOTE, STOP_EMOTE, unicode,
    };
    use crate::pagination::list::ListPages;
    use crate::pagination::page::Page;
    use crate::pagination::paginator::{PageSource, Paginator};
    use crate::pagination::test_support::{EditorCall, RecordingEditor};

    const OWNER: u64 = 7;

    fn message(id: u64) -> PaginatedMessage {
        PaginatedMessage::new(serenity::ChannelId::new(10), serenity::MessageId::new(id))
    }

    fn three_pages() -> ListPages {
        ListPages::new(
            "Pages",
            vec!["one".to_owned(), "two".to_owned(), "three".to_owned()],
        )
    }

    fn reaction(message_id: u64, emote: &str) -> PageReaction {
        PageReaction {
            message_id: serenity::MessageId::new(message_id),
            user_id: serenity::UserId::new(OWNER),
            user_is_bot: false,
            emote: unicode(emote),
        }
    }

    async fn eventually(check: impl Fn() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        check()
    }

    struct FailingTeardown;

    #[async_trait]
    impl PageSource for FailingTeardown {
        async fn get_page(
            &mut self,
            _user_id: serenity::UserId,
            _navigation: Option<Navigation>,
        ) -> anyhow::Result<Page> {
            Ok(Page::new("Failing", "page"))
        }

        async fn close(&mut self, _message: PaginatedMessage) -> anyhow::Result<()> {
            anyhow::bail!("reactions already gone")
        }
    }

    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PageSource for GatedSource {
        async fn get_page(
            &mut self,
            _user_id: serenity::UserId,
            _navigation: Option<Navigation>,
        ) -> anyhow::Result<Page> {
            self.gate.notified().await;
            Ok(Page::new("Gated", "late page"))
        }
    }

    /// Holds the first page edit until the gate opens.
    struct GatedEditor {
        inner: RecordingEditor,
        gate: Arc<Notify>,
        held: AtomicBool,
    }

    #[async_trait]
    impl MessageEditor for GatedEditor {
        async fn edit_page(&self, message: PaginatedMessage, page: &Page) -> anyhow::Result<()> {
            self.inner.edit_page(message, page).await?;
            if !self.held.swap(true, Ordering::SeqCst) {
                self.gate.notified().await;
            }
            Ok(())
        }

        async fn add_reactions(
            &self,
            message: PaginatedMessage,
            emotes: &EmoteSet,
        ) -> anyhow::Result<()> {
            self.inner.add_reactions(message, emotes).await
        }

        async fn remove_reaction(
            &self,
            message: PaginatedMessage,
            emote: &serenity::ReactionType,
            user_id: serenity::UserId,
        ) -> anyhow::Result<()> {
            self.inner.remove_reaction(message, emote, user_id).await
        }

        async fn clear_reactions(&self, message: PaginatedMessage) -> anyhow::Result<()> {
            self.inner.clear_reactions(message).await
        }
    }

    #[tokio::test]
    async fn register_then_dispose_leaves_no_entry() {
        let (editor, _calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));

        let paginator =
            Paginator::new(message(1), EmoteSet::arrows(), three_pages()).register(&service);
        assert!(service.get(serenity::MessageId::new(1)).is_some());
        assert_eq!(service.len(), 1);

        paginator.dispose().await;
        assert!(service.get(serenity::MessageId::new(1)).is_none());
        assert!(service.is_empty());

        paginator.dispose().await;
        assert!(service.get(serenity::MessageId::new(1)).is_none());
        assert!(paginator.is_closed());
    }

    #[tokio::test]
    async fn next_then_previous_walks_pages_and_dispose_is_idempotent() {
        let (editor, _calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        let user = serenity::UserId::new(OWNER);

        let paginator =
            Paginator::new(message(1), EmoteSet::arrows(), three_pages()).register(&service);

        let second = paginator.get_page(user, &unicode(NEXT_EMOTE)).await.unwrap();
        assert_eq!(second.body(), "two");
        assert_eq!(second.footer(), Some("Page 2/3"));

        let first = paginator.get_page(user, &unicode(PREVIOUS_EMOTE)).await.unwrap();
        assert_eq!(first.body(), "one");

        paginator.dispose().await;
        assert!(service.get(serenity::MessageId::new(1)).is_none());
        paginator.dispose().await;
    }

    #[tokio::test]
    async fn reactions_edit_the_message_in_order() {
        let (editor, mut calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        let _paginator = Paginator::new(message(1), EmoteSet::arrows(), three_pages())
            .owned_by(serenity::UserId::new(OWNER))
            .register(&service);

        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
        assert!(service.handle_reaction(reaction(1, PREVIOUS_EMOTE)));

        let mut bodies = Vec::new();
        while bodies.len() < 3 {
            match calls.recv().await {
                Some(EditorCall::Edit(edited, page)) => {
                    assert_eq!(edited, message(1));
                    bodies.push(page.body().to_owned());
                }
                Some(EditorCall::RemoveReaction(_, _, user_id)) => {
                    assert_eq!(user_id, serenity::UserId::new(OWNER));
                }
                other => panic!("unexpected editor call: {other:?}"),
            }
        }

        assert_eq!(bodies, vec!["two", "three", "two"]);
    }

    #[tokio::test]
    async fn ignores_reactions_it_should_not_dispatch() {
        let (editor, mut calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        service.set_current_user(serenity::UserId::new(99));
        let _paginator = Paginator::new(message(1), EmoteSet::arrows(), three_pages())
            .owned_by(serenity::UserId::new(OWNER))
            .register(&service);

        let mut from_bot = reaction(1, NEXT_EMOTE);
        from_bot.user_is_bot = true;
        assert!(!service.handle_reaction(from_bot));

        let mut from_self = reaction(1, NEXT_EMOTE);
        from_self.user_id = serenity::UserId::new(99);
        assert!(!service.handle_reaction(from_self));

        assert!(!service.handle_reaction(reaction(2, NEXT_EMOTE)));

        let mut from_stranger = reaction(1, NEXT_EMOTE);
        from_stranger.user_id = serenity::UserId::new(8);
        assert!(!service.handle_reaction(from_stranger));
        assert!(!service.handle_reaction(reaction(1, STOP_EMOTE)));

        let mut removed = Vec::new();
        for _ in 0..2 {
            match calls.recv().await {
                Some(EditorCall::RemoveReaction(removed_from, emote, user_id)) => {
                    assert_eq!(removed_from, message(1));
                    removed.push((emote, user_id.get()));
                }
                other => panic!("unexpected editor call: {other:?}"),
            }
        }
        assert!(removed.contains(&(unicode(NEXT_EMOTE), 8)));
        assert!(removed.contains(&(unicode(STOP_EMOTE), OWNER)));

        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(calls.try_recv().is_err());

        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registration_of_distinct_messages() {
        let (editor, _calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));

        let handles = (1..=2)
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move {
                    Paginator::new(message(id), EmoteSet::arrows(), three_pages())
                        .register(&service)
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(service.len(), 2);
        assert!(service.get(serenity::MessageId::new(1)).is_some());
        assert!(service.get(serenity::MessageId::new(2)).is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_replaces_and_closes_the_old_paginator() {
        let (editor, mut calls) = RecordingEditor::new();
        let editor = Arc::new(editor);
        let service = PaginationService::new(editor.clone());

        let first = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            three_pages().clear_on_close(editor.clone()),
        )
        .register(&service);
        let second =
            Paginator::new(message(1), EmoteSet::arrows(), three_pages()).register(&service);

        assert!(matches!(calls.recv().await, Some(EditorCall::Edit(..))));
        assert_eq!(calls.recv().await, Some(EditorCall::ClearReactions(message(1))));
        assert!(eventually(|| first.is_closed()).await);

        let live = service.get(serenity::MessageId::new(1)).unwrap();
        assert!(Arc::ptr_eq(&live, &second));
        assert_eq!(service.len(), 1);

        service.remove_paginator(&first);
        assert_eq!(service.len(), 1);
    }

    #[tokio::test]
    async fn stop_emote_disposes() {
        let (editor, mut calls) = RecordingEditor::new();
        let editor = Arc::new(editor);
        let service = PaginationService::new(editor.clone());
        let paginator = Paginator::new(
            message(1),
            EmoteSet::standard(),
            three_pages().clear_on_close(editor.clone()),
        )
        .register(&service);

        assert!(service.handle_reaction(reaction(1, STOP_EMOTE)));

        match calls.recv().await {
            Some(EditorCall::Edit(_, page)) => assert_eq!(page.footer(), None),
            other => panic!("unexpected editor call: {other:?}"),
        }
        assert_eq!(calls.recv().await, Some(EditorCall::ClearReactions(message(1))));
        assert!(eventually(|| service.is_empty()).await);
        assert!(paginator.is_closed());
    }

    #[tokio::test]
    async fn idle_paginators_are_disposed() {
        let (editor, _calls) = RecordingEditor::new();
        let service =
            PaginationService::with_idle_timeout(Arc::new(editor), Duration::from_millis(20));
        let paginator =
            Paginator::new(message(1), EmoteSet::arrows(), three_pages()).register(&service);

        assert!(eventually(|| service.is_empty()).await);
        assert!(paginator.is_closed());
    }

    #[tokio::test]
    async fn failed_teardown_still_deregisters() {
        let (editor, _calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        let paginator =
            Paginator::new(message(1), EmoteSet::arrows(), FailingTeardown).register(&service);

        paginator.dispose().await;
        assert!(service.is_empty());
        assert!(paginator.is_closed());
    }

    #[tokio::test]
    async fn page_rendered_during_disposal_is_discarded() {
        let (editor, mut calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        let gate = Arc::new(Notify::new());
        let paginator = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            GatedSource { gate: gate.clone() },
        )
        .register(&service);

        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let disposing = tokio::spawn({
            let paginator = paginator.clone();
            async move { paginator.dispose().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(paginator.is_closed());

        gate.notify_one();
        disposing.await.unwrap();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        assert!(service.is_empty());
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn teardown_waits_for_an_in_flight_page_edit() {
        let (recorder, mut calls) = RecordingEditor::new();
        let gate = Arc::new(Notify::new());
        let editor = Arc::new(GatedEditor {
            inner: recorder,
            gate: gate.clone(),
            held: AtomicBool::new(false),
        });
        let service = PaginationService::new(editor.clone());
        let paginator = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            three_pages().clear_on_close(editor.clone()),
        )
        .owned_by(serenity::UserId::new(OWNER))
        .register(&service);

        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
        match calls.recv().await {
            Some(EditorCall::Edit(_, page)) => assert_eq!(page.footer(), Some("Page 2/3")),
            other => panic!("unexpected editor call: {other:?}"),
        }

        let disposing = tokio::spawn({
            let paginator = paginator.clone();
            async move { paginator.dispose().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(paginator.is_closed());
        assert!(calls.try_recv().is_err());

        gate.notify_one();
        disposing.await.unwrap();

        assert!(matches!(
            calls.recv().await,
            Some(EditorCall::RemoveReaction(..))
        ));
        match calls.recv().await {
            Some(EditorCall::Edit(_, page)) => assert_eq!(page.footer(), None),
            other => panic!("unexpected editor call: {other:?}"),
        }
        assert_eq!(calls.recv().await, Some(EditorCall::ClearReactions(message(1))));
        assert!(service.is_empty());
    }

    #[tokio::test]
    async fn failed_edits_do_not_stop_the_worker() {
        let (editor, mut calls) = RecordingEditor::failing();
        let service = PaginationService::new(Arc::new(editor));
        let _paginator =
            Paginator::new(message(1), EmoteSet::arrows(), three_pages()).register(&service);

        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));
        assert!(service.handle_reaction(reaction(1, NEXT_EMOTE)));

        let mut edits = 0;
        while edits < 2 {
            if let Some(EditorCall::Edit(..)) = calls.recv().await {
                edits += 1;
            }
        }
    }

    #[tokio::test]
    async fn release_and_shutdown_dispose_live_paginators() {
        let (editor, _calls) = RecordingEditor::new();
        let service = PaginationService::new(Arc::new(editor));
        for id in 1..=3 {
            Paginator::new(message(id), EmoteSet::arrows(), three_pages()).register(&service);
        }

        service.release(serenity::MessageId::new(2)).await;
        assert_eq!(service.len(), 2);
        service.release(serenity::MessageId::new(2)).await;

        service.shutdown().await;
        assert!(service.is_empty());
    }
}
