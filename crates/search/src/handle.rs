use crate::cache::QueryCache;
use crate::config::SuggestConfig;
use crate::engine::TypeaheadEngine;
use crate::error::{Result, SearchError};
use crate::provider::SuggestionProvider;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time;
use typeahead_protocol::{Candidate, SessionSnapshot};

enum SessionCommand {
    TextChanged(String),
    Choose {
        id: String,
        reply: oneshot::Sender<Result<Candidate>>,
    },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// A search session running on its own task.
///
/// Keystrokes, timer expiry and provider responses are handled one at a
/// time by that task. Readers observe it through [`SessionSnapshot`]s.
/// Dropping every handle (or calling [`TypeaheadHandle::shutdown`]) destroys
/// the session together with its pending timer and in-flight lookup.
#[derive(Clone)]
pub struct TypeaheadHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl TypeaheadHandle {
    pub fn spawn(
        provider: Arc<dyn SuggestionProvider>,
        cache: QueryCache,
        config: &SuggestConfig,
    ) -> Result<Self> {
        config.validate()?;
        let engine = TypeaheadEngine::new(provider, cache, config);
        let (command_tx, command_rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        tokio::spawn(run_session(engine, command_rx, snapshot_tx));
        Ok(Self {
            command_tx,
            snapshot_rx,
        })
    }

    pub async fn text_changed(&self, raw: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::TextChanged(raw.into())).await
    }

    pub async fn choose(&self, id: impl Into<String>) -> Result<Candidate> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Choose {
            id: id.into(),
            reply,
        })
        .await?;
        reply_rx.await.map_err(|_| SearchError::SessionClosed)?
    }

    /// Issue the pending lookup without waiting out the quiet interval.
    ///
    /// Returns once every earlier command has been applied and published, so
    /// a following [`TypeaheadHandle::snapshot`] is never older than them.
    pub async fn flush(&self) -> Result<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Flush(reply)).await?;
        reply_rx.await.map_err(|_| SearchError::SessionClosed)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut rx = self.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SearchError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SearchError::SessionClosed)
    }
}

async fn run_session(
    mut engine: TypeaheadEngine,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
) {
    loop {
        let next_deadline = engine.deadline();

        tokio::select! {
            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::TextChanged(raw)) => engine.on_text_changed(&raw),
                    Some(SessionCommand::Choose { id, reply }) => {
                        let _ = reply.send(engine.on_candidate_chosen(&id));
                    }
                    Some(SessionCommand::Flush(reply)) => {
                        engine.flush();
                        publish(&snapshot_tx, engine.snapshot());
                        let _ = reply.send(());
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                }
            }
            Some(response) = engine.next_response() => {
                engine.handle_response(response);
            }
            () = async {
                if let Some(deadline) = next_deadline {
                    time::sleep_until(deadline).await;
                }
            }, if next_deadline.is_some() => {
                engine.fire_due();
            }
        }

        publish(&snapshot_tx, engine.snapshot());
    }

    engine.shutdown();
    log::debug!("Search session closed");
}

fn publish(snapshot_tx: &watch::Sender<SessionSnapshot>, next: SessionSnapshot) {
    snapshot_tx.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}
