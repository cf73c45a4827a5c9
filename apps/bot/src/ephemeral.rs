use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, instrument, warn};
use tracing_futures::Instrument;

use crate::platform::{MessageRef, Messenger, Reply};

/// A reply and its trigger waiting to be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub reply: MessageRef,
    pub trigger: MessageRef,
    pub fire_at: DateTime<Utc>,
}

type Registry = HashMap<MessageRef, (PendingDeletion, AbortHandle)>;

/// Sends replies that clean up after themselves.
///
/// Every successful reply schedules one deletion task keyed by the reply
/// message. A task that has started deleting is no longer in the registry and
/// can't be cancelled, so each message sees at most one delete attempt.
pub struct EphemeralReplies<M> {
    messenger: Arc<M>,
    pending: Arc<Mutex<Registry>>,
}

impl<M: Messenger> EphemeralReplies<M> {
    pub fn new(messenger: M) -> Self {
        Self {
            messenger: Arc::new(messenger),
            pending: Arc::default(),
        }
    }

    #[instrument(
        name = "ephemeral_reply",
        skip(self, reply),
        fields(channel_id = trigger.channel_id, trigger_id = trigger.message_id)
    )]
    pub async fn send(
        &self,
        trigger: MessageRef,
        reply: Reply,
        ttl: Duration,
    ) -> Option<PendingDeletion> {
        let sent = match self.messenger.reply(trigger, &reply).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "reply failed, nothing to delete");
                return None;
            }
        };

        let deletion = PendingDeletion {
            reply: sent,
            trigger,
            fire_at: fire_at(ttl),
        };

        let messenger = Arc::clone(&self.messenger);
        let registry = Arc::clone(&self.pending);
        let span = info_span!(
            "ephemeral_delete",
            reply_id = sent.message_id,
            trigger_id = trigger.message_id
        );

        // Held across spawn so the task can't look up its entry before it exists.
        let mut pending = lock(&self.pending);
        let task = tokio::spawn(
            async move {
                tokio::time::sleep(ttl).await;
                lock(&registry).remove(&sent);
                delete_pair(messenger.as_ref(), sent, trigger).await;
            }
            .instrument(span),
        );
        pending.insert(sent, (deletion.clone(), task.abort_handle()));
        drop(pending);

        debug!(
            reply_id = sent.message_id,
            ttl_ms = ttl.as_millis() as u64,
            "deletion scheduled"
        );
        Some(deletion)
    }

    /// Deletions that have not fired yet.
    pub fn pending(&self) -> Vec<PendingDeletion> {
        lock(&self.pending)
            .values()
            .map(|(deletion, _)| deletion.clone())
            .collect()
    }

    /// Abandons the deletion scheduled for `reply`. Returns false if it
    /// already fired or never existed.
    pub fn cancel(&self, reply: MessageRef) -> bool {
        match lock(&self.pending).remove(&reply) {
            Some((_, handle)) => {
                handle.abort();
                debug!(reply_id = reply.message_id, "deletion cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.pending).drain().collect();
        for (_, (_, handle)) in &drained {
            handle.abort();
        }

        if !drained.is_empty() {
            info!(count = drained.len(), "pending deletions cancelled");
        }
        drained.len()
    }
}

async fn delete_pair<M: Messenger>(messenger: &M, reply: MessageRef, trigger: MessageRef) {
    match messenger.delete(reply).await {
        Ok(()) => debug!("reply deleted"),
        Err(e) => warn!(error = %e, "reply delete failed"),
    }

    match messenger.delete(trigger).await {
        Ok(()) => debug!("trigger deleted"),
        Err(e) => warn!(error = %e, "trigger delete failed"),
    }
}

fn fire_at(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;

    use super::*;
    use crate::platform::{ReplyDeleteError, ReplySendError};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Op {
        Reply(MessageRef, Reply),
        Delete(MessageRef),
    }

    /// In-memory messenger that records every call.
    #[derive(Default, Clone)]
    pub struct FakeMessenger {
        pub ops: Arc<Mutex<Vec<Op>>>,
        pub fail_reply: bool,
        pub fail_delete: HashSet<MessageRef>,
    }

    impl FakeMessenger {
        pub fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }

        pub fn deletes(&self) -> Vec<MessageRef> {
            self.ops()
                .into_iter()
                .filter_map(|op| match op {
                    Op::Delete(m) => Some(m),
                    Op::Reply(..) => None,
                })
                .collect()
        }

        pub fn replies(&self) -> Vec<Reply> {
            self.ops()
                .into_iter()
                .filter_map(|op| match op {
                    Op::Reply(_, r) => Some(r),
                    Op::Delete(_) => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl Messenger for FakeMessenger {
        async fn reply(
            &self,
            trigger: MessageRef,
            reply: &Reply,
        ) -> Result<MessageRef, ReplySendError> {
            if self.fail_reply {
                return Err(ReplySendError {
                    trigger,
                    reason: "missing permissions".into(),
                });
            }
            let mut ops = self.ops.lock().unwrap();
            ops.push(Op::Reply(trigger, reply.clone()));
            Ok(MessageRef::new(trigger.channel_id, 1000 + ops.len() as u64))
        }

        async fn delete(&self, message: MessageRef) -> Result<(), ReplyDeleteError> {
            self.ops.lock().unwrap().push(Op::Delete(message));
            if self.fail_delete.contains(&message) {
                return Err(ReplyDeleteError {
                    message,
                    reason: "unknown message".into(),
                });
            }
            Ok(())
        }
    }

    const TTL: Duration = Duration::from_millis(30_000);

    fn trigger() -> MessageRef {
        MessageRef::new(7, 1)
    }

    fn text() -> Reply {
        Reply::Text("hi".into())
    }

    #[tokio::test(start_paused = true)]
    async fn deletes_reply_then_trigger_after_ttl() {
        let messenger = FakeMessenger::default();
        let replies = EphemeralReplies::new(messenger.clone());

        let deletion = replies.send(trigger(), text(), TTL).await.unwrap();
        assert_eq!(deletion.trigger, trigger());
        assert_eq!(replies.pending(), vec![deletion.clone()]);

        tokio::time::sleep(TTL - Duration::from_millis(1)).await;
        assert!(messenger.deletes().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(messenger.deletes(), vec![deletion.reply, trigger()]);
        assert!(replies.pending().is_empty());

        tokio::time::sleep(TTL * 3).await;
        assert_eq!(messenger.deletes().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_send_schedules_nothing() {
        let messenger = FakeMessenger {
            fail_reply: true,
            ..Default::default()
        };
        let replies = EphemeralReplies::new(messenger.clone());

        assert!(replies.send(trigger(), text(), TTL).await.is_none());
        assert!(replies.pending().is_empty());

        tokio::time::sleep(TTL * 2).await;
        assert!(messenger.ops().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reply_delete_still_deletes_trigger() {
        let reply_ref = MessageRef::new(7, 1001);
        let messenger = FakeMessenger {
            fail_delete: HashSet::from([reply_ref]),
            ..Default::default()
        };
        let replies = EphemeralReplies::new(messenger.clone());

        let deletion = replies.send(trigger(), text(), TTL).await.unwrap();
        assert_eq!(deletion.reply, reply_ref);

        tokio::time::sleep(TTL + Duration::from_secs(1)).await;
        assert_eq!(messenger.deletes(), vec![reply_ref, trigger()]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_deletion_never_fires() {
        let messenger = FakeMessenger::default();
        let replies = EphemeralReplies::new(messenger.clone());

        let first = replies.send(trigger(), text(), TTL).await.unwrap();
        let second = replies
            .send(MessageRef::new(7, 2), text(), TTL)
            .await
            .unwrap();

        assert!(replies.cancel(first.reply));
        assert!(!replies.cancel(first.reply));

        tokio::time::sleep(TTL * 2).await;
        assert_eq!(messenger.deletes(), vec![second.reply, second.trigger]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_abandons_everything() {
        let messenger = FakeMessenger::default();
        let replies = EphemeralReplies::new(messenger.clone());

        replies.send(trigger(), text(), TTL).await.unwrap();
        replies
            .send(MessageRef::new(8, 3), text(), TTL * 2)
            .await
            .unwrap();

        assert_eq!(replies.cancel_all(), 2);
        assert!(replies.pending().is_empty());

        tokio::time::sleep(TTL * 3).await;
        assert!(messenger.deletes().is_empty());
    }
}
