//! Fakes shared by service and handler tests.

use crate::server::AppState;
use futures_util::stream::{self, StreamExt};
use lib_ai::{
    ChatProvider, ChatTurn, FragmentStream, ModeFlags, ModelInfo, ProviderError, ProviderKind,
    ProviderRegistry,
};
use lib_core::{create_memory_pool, Config, DbPool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted provider that records the conversations it receives.
pub(crate) struct FakeProvider {
    kind: ProviderKind,
    configured: bool,
    reply: Result<String, ProviderError>,
    fragments: Vec<Result<String, ProviderError>>,
    hang_after_fragments: bool,
    close_on_call: Mutex<Option<DbPool>>,
    pub stream_dropped: Arc<AtomicBool>,
    pub received: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
    pub models: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub fn replying(kind: ProviderKind, reply: &str) -> Self {
        Self {
            kind,
            configured: true,
            reply: Ok(reply.to_string()),
            fragments: Vec::new(),
            hang_after_fragments: false,
            close_on_call: Mutex::new(None),
            stream_dropped: Arc::new(AtomicBool::new(false)),
            received: Arc::new(Mutex::new(Vec::new())),
            models: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(kind: ProviderKind, err: ProviderError) -> Self {
        Self {
            reply: Err(err),
            ..Self::replying(kind, "")
        }
    }

    pub fn unconfigured(kind: ProviderKind) -> Self {
        Self {
            configured: false,
            ..Self::replying(kind, "")
        }
    }

    pub fn streaming(kind: ProviderKind, fragments: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            fragments,
            ..Self::replying(kind, "")
        }
    }

    /// Never finish after the scripted fragments.
    pub fn hanging(mut self) -> Self {
        self.hang_after_fragments = true;
        self
    }

    /// Close `db` during the next call, so every later write fails.
    pub fn close_pool_on_call(&self, db: DbPool) {
        *self.close_on_call.lock().unwrap() = Some(db);
    }

    async fn record(&self, turns: &[ChatTurn], model: &str) {
        self.received.lock().unwrap().push(turns.to_vec());
        self.models.lock().unwrap().push(model.to_string());
        let db = self.close_on_call.lock().unwrap().take();
        if let Some(db) = db {
            db.close().await;
        }
    }

    fn check_configured(&self) -> Result<(), ProviderError> {
        if self.configured {
            Ok(())
        } else {
            Err(ProviderError::Unconfigured { provider: self.kind })
        }
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ChatProvider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        turns: &[ChatTurn],
        model: &str,
        _modes: ModeFlags,
    ) -> Result<String, ProviderError> {
        self.check_configured()?;
        self.record(turns, model).await;
        self.reply.clone()
    }

    async fn stream(
        &self,
        turns: &[ChatTurn],
        model: &str,
        _modes: ModeFlags,
    ) -> Result<FragmentStream, ProviderError> {
        self.check_configured()?;
        self.record(turns, model).await;

        let guard = DropFlag(self.stream_dropped.clone());
        let scripted = stream::iter(self.fragments.clone());
        let fragments: FragmentStream = if self.hang_after_fragments {
            scripted.chain(stream::pending()).boxed()
        } else {
            scripted.boxed()
        };
        Ok(fragments
            .map(move |item| {
                let _keep = &guard;
                item
            })
            .boxed())
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        self.check_configured()?;
        Ok(vec![ModelInfo {
            id: "fake-1".to_string(),
            name: "Fake One".to_string(),
        }])
    }
}

/// Registry with the given providers; kinds left out report `Unconfigured`.
pub(crate) fn registry_with(providers: Vec<Arc<FakeProvider>>) -> Arc<ProviderRegistry> {
    let registry = providers
        .into_iter()
        .fold(ProviderRegistry::new(), |registry, p| {
            registry.with_provider(p as Arc<dyn ChatProvider>)
        });
    Arc::new(registry)
}

/// Application state over a fresh in-memory database.
pub(crate) async fn test_state(config: Config, providers: Vec<Arc<FakeProvider>>) -> AppState {
    let db = create_memory_pool().await.expect("in-memory database");
    AppState {
        db,
        config,
        providers: registry_with(providers),
    }
}

/// Wait until `flag` is set, failing the test after two seconds.
pub(crate) async fn wait_for(flag: &AtomicBool) {
    for _ in 0..200 {
        if flag.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
