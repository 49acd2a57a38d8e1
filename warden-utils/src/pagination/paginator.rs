use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use super::editor::{MessageEditor, PaginatedMessage};
use super::emotes::{EmoteSet, Navigation};
use super::page::Page;
use super::service::{PaginationService, Registry};

/// Where a paginator's pages come from.
///
/// `navigation` is `None` when the reaction is not part of the paginator's
/// emote set; sources answer with their current page in that case.
#[async_trait]
pub trait PageSource: Send {
    async fn get_page(
        &mut self,
        user_id: serenity::UserId,
        navigation: Option<Navigation>,
    ) -> anyhow::Result<Page>;

    /// Source-specific teardown, run once when the paginator closes.
    async fn close(&mut self, _message: PaginatedMessage) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A live paginated message.
///
/// Paginators compare and hash by message identity only.
pub struct Paginator {
    message: PaginatedMessage,
    emotes: EmoteSet,
    owner: Option<serenity::UserId>,
    source: Mutex<Box<dyn PageSource>>,
    closing: AtomicBool,
    closed: OnceCell<()>,
    disposed: OnceCell<()>,
    service: Weak<Registry>,
}

impl Paginator {
    pub fn new(
        message: PaginatedMessage,
        emotes: EmoteSet,
        source: impl PageSource + 'static,
    ) -> Self {
        Self {
            message,
            emotes,
            owner: None,
            source: Mutex::new(Box::new(source)),
            closing: AtomicBool::new(false),
            closed: OnceCell::new(),
            disposed: OnceCell::new(),
            service: Weak::new(),
        }
    }

    /// Only accept reactions from `user_id`.
    pub fn owned_by(mut self, user_id: serenity::UserId) -> Self {
        self.owner = Some(user_id);
        self
    }

    /// Finish construction by registering with `service`.
    pub fn register(mut self, service: &PaginationService) -> Arc<Self> {
        self.service = service.downgrade();
        let paginator = Arc::new(self);
        service.add_paginator(Arc::clone(&paginator));
        paginator
    }

    pub fn message(&self) -> PaginatedMessage {
        self.message
    }

    pub fn emotes(&self) -> &EmoteSet {
        &self.emotes
    }

    pub fn owner(&self) -> Option<serenity::UserId> {
        self.owner
    }

    pub fn accepts(&self, user_id: serenity::UserId) -> bool {
        self.owner.is_none_or(|owner| owner == user_id)
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Compute the page to show after `user_id` reacted with `emote`.
    ///
    /// Returns `None` once the paginator is closed, or when the source failed
    /// to render (the failure is logged).
    pub async fn get_page(
        &self,
        user_id: serenity::UserId,
        emote: &serenity::ReactionType,
    ) -> Option<Page> {
        if self.is_closed() {
            return None;
        }

        let mut source = self.source.lock().await;
        self.render(&mut **source, user_id, emote).await
    }

    /// Render the next page and apply it to the message, then take back the
    /// user's reaction.
    ///
    /// The source lock is held until the message is updated. Teardown takes
    /// the same lock, so a page never lands on a message that was already
    /// closed.
    pub(crate) async fn turn_page(
        &self,
        editor: &dyn MessageEditor,
        user_id: serenity::UserId,
        emote: &serenity::ReactionType,
    ) {
        if self.is_closed() {
            return;
        }

        let mut source = self.source.lock().await;
        let Some(page) = self.render(&mut **source, user_id, emote).await else {
            return;
        };

        if self.is_closed() {
            debug!(
                message_id = self.message.message_id.get(),
                "discarding page rendered for closed paginator"
            );
            return;
        }

        if let Err(err) = editor.edit_page(self.message, &page).await {
            warn!(
                ?err,
                message_id = self.message.message_id.get(),
                "failed to edit paginated message"
            );
        }

        if let Err(err) = editor.remove_reaction(self.message, emote, user_id).await {
            debug!(
                ?err,
                message_id = self.message.message_id.get(),
                "failed to remove page reaction"
            );
        }
    }

    async fn render(
        &self,
        source: &mut dyn PageSource,
        user_id: serenity::UserId,
        emote: &serenity::ReactionType,
    ) -> Option<Page> {
        if self.is_closed() {
            return None;
        }

        let navigation = self.emotes.navigation_for(emote);
        match source.get_page(user_id, navigation).await {
            Ok(page) => Some(page),
            Err(err) => {
                warn!(
                    ?err,
                    message_id = self.message.message_id.get(),
                    "page source failed to render page"
                );
                None
            }
        }
    }

    /// Run the source teardown. Only the first call does any work; later
    /// calls wait for it and return `Ok(())`.
    pub async fn close(&self) -> anyhow::Result<()> {
        let mut outcome = Ok(());
        let slot = &mut outcome;

        self.closed
            .get_or_init(|| async move {
                self.closing.store(true, Ordering::Release);
                let mut source = self.source.lock().await;
                *slot = source.close(self.message).await;
            })
            .await;

        outcome
    }

    /// Close, then drop the registry entry. Runs once; concurrent callers
    /// return after the first disposal has finished.
    pub async fn dispose(&self) {
        self.disposed
            .get_or_init(|| async {
                let _deregister = Deregister(self);

                if let Err(err) = self.close().await {
                    warn!(
                        ?err,
                        message_id = self.message.message_id.get(),
                        "paginator teardown failed; deregistering anyway"
                    );
                }
            })
            .await;
    }

    /// Drive [`Paginator::dispose`] to completion from synchronous code.
    ///
    /// This is the one place the engine blocks on async work. On a
    /// multi-threaded runtime the current worker is handed off while the
    /// disposal runs; outside any runtime a private one is spun up. A
    /// current-thread runtime cannot be blocked from inside, so there the
    /// disposal is spawned instead and finishes on the next poll.
    pub fn dispose_blocking(self: &Arc<Self>) {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.dispose()));
            }
            Ok(handle) => {
                let paginator = Arc::clone(self);
                handle.spawn(async move { paginator.dispose().await });
            }
            Err(_) => match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(self.dispose()),
                Err(err) => warn!(
                    ?err,
                    message_id = self.message.message_id.get(),
                    "failed to start runtime for paginator disposal"
                ),
            },
        }
    }
}

/// Removes the registry entry when dropped, so deregistration also happens if
/// teardown panics or the disposing task is cancelled.
struct Deregister<'a>(&'a Paginator);

impl Drop for Deregister<'_> {
    fn drop(&mut self) {
        let paginator = self.0;
        paginator.closing.store(true, Ordering::Release);

        if let Some(registry) = paginator.service.upgrade() {
            registry.remove(paginator);
        }

        debug!(
            message_id = paginator.message.message_id.get(),
            "paginator disposed"
        );
    }
}

impl PartialEq for Paginator {
    fn eq(&self, other: &Self) -> bool {
        self.message.message_id == other.message.message_id
    }
}

impl Eq for Paginator {}

impl Hash for Paginator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.message_id.hash(state);
    }
}

impl fmt::Debug for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("message", &self.message)
            .field("emotes", &self.emotes)
            .field("owner", &self.owner)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use poise::serenity_prelude as serenity;

    use super::{PageSource, Paginator};
    use crate::pagination::editor::PaginatedMessage;
    use crate::pagination::emotes::{EmoteSet, NEXT_EMOTE, Navigation, STOP_EMOTE, unicode};
    use crate::pagination::list::ListPages;
    use crate::pagination::page::Page;

    fn message(id: u64) -> PaginatedMessage {
        PaginatedMessage::new(serenity::ChannelId::new(10), serenity::MessageId::new(id))
    }

    fn user() -> serenity::UserId {
        serenity::UserId::new(7)
    }

    struct CountingTeardown {
        closes: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl PageSource for CountingTeardown {
        async fn get_page(
            &mut self,
            _user_id: serenity::UserId,
            _navigation: Option<Navigation>,
        ) -> anyhow::Result<Page> {
            Ok(Page::new("Counting", "only page"))
        }

        async fn close(&mut self, _message: PaginatedMessage) -> anyhow::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("teardown failed");
            }
            Ok(())
        }
    }

    #[test]
    fn equality_follows_message_identity_only() {
        let left = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            ListPages::new("Left", vec!["a".into(), "b".into()]),
        );
        let right = Paginator::new(
            message(1),
            EmoteSet::standard(),
            ListPages::new("Right", vec!["x".into()]),
        )
        .owned_by(user());
        let other = Paginator::new(
            message(2),
            EmoteSet::arrows(),
            ListPages::new("Left", vec!["a".into(), "b".into()]),
        );

        assert_eq!(left, right);
        assert_ne!(left, other);

        let mut seen = HashSet::new();
        seen.insert(&left);
        assert!(!seen.insert(&right));
        assert!(seen.insert(&other));
    }

    #[tokio::test]
    async fn foreign_emote_returns_current_page() {
        let paginator = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            ListPages::new("List", vec!["one".into(), "two".into()]),
        );

        let next = paginator.get_page(user(), &unicode(NEXT_EMOTE)).await;
        assert_eq!(next.map(|page| page.body().to_owned()), Some("two".into()));

        let foreign = paginator.get_page(user(), &unicode(STOP_EMOTE)).await;
        assert_eq!(foreign.map(|page| page.body().to_owned()), Some("two".into()));
    }

    #[tokio::test]
    async fn close_runs_teardown_once_and_rejects_pages() {
        let closes = Arc::new(AtomicUsize::new(0));
        let paginator = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            CountingTeardown {
                closes: Arc::clone(&closes),
                fail: false,
            },
        );

        assert!(paginator.close().await.is_ok());
        assert!(paginator.close().await.is_ok());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(paginator.is_closed());
        assert!(paginator.get_page(user(), &unicode(NEXT_EMOTE)).await.is_none());
    }

    #[tokio::test]
    async fn failed_close_is_reported_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let paginator = Paginator::new(
            message(1),
            EmoteSet::arrows(),
            CountingTeardown {
                closes: Arc::clone(&closes),
                fail: true,
            },
        );

        assert!(paginator.close().await.is_err());
        assert!(paginator.close().await.is_ok());
        paginator.dispose().await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_disposal_closes_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let paginator = Arc::new(Paginator::new(
            message(1),
            EmoteSet::arrows(),
            CountingTeardown {
                closes: Arc::clone(&closes),
                fail: false,
            },
        ));

        tokio::join!(paginator.dispose(), paginator.dispose(), paginator.dispose());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blocking_disposal_works_without_a_runtime() {
        let closes = Arc::new(AtomicUsize::new(0));
        let paginator = Arc::new(Paginator::new(
            message(1),
            EmoteSet::arrows(),
            CountingTeardown {
                closes: Arc::clone(&closes),
                fail: false,
            },
        ));

        paginator.dispose_blocking();
        paginator.dispose_blocking();
        assert!(paginator.is_closed());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_disposal_on_multi_thread_runtime_finishes_before_return() {
        let closes = Arc::new(AtomicUsize::new(0));
        let paginator = Arc::new(Paginator::new(
            message(1),
            EmoteSet::arrows(),
            CountingTeardown {
                closes: Arc::clone(&closes),
                fail: false,
            },
        ));

        paginator.dispose_blocking();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
