//! Fakes shared by the driver and scheduler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use unisync_core::InstitutionRecord;
use unisync_source::{InstitutionSource, SourceError};
use unisync_storage::memory::MemoryStore;

use crate::error::NotifyError;
use crate::notifier::Notifier;
use crate::pipeline::SyncPipeline;

pub(crate) fn record(name: &str, code: &str, country: &str) -> InstitutionRecord {
    InstitutionRecord {
        name: name.to_owned(),
        alpha_two_code: code.to_owned(),
        country: country.to_owned(),
        state_province: None,
    }
}

/// One scripted answer of [`ScriptedSource`].
#[derive(Clone)]
pub(crate) enum Reply {
    Records(Vec<InstitutionRecord>),
    Malformed,
    Hang(Duration),
    Panic,
}

/// Answers each fetch with the next scripted reply; repeats the last one.
pub(crate) struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<usize>,
}

impl ScriptedSource {
    pub(crate) fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into()), calls: Mutex::new(0) })
    }

    pub(crate) fn always(reply: Reply) -> Arc<Self> {
        Self::new(vec![reply])
    }

    pub(crate) fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn next_reply(&self) -> Reply {
        *self.calls.lock().unwrap() += 1;
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl InstitutionSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<InstitutionRecord>, SourceError> {
        match self.next_reply() {
            Reply::Records(records) => Ok(records),
            Reply::Malformed => {
                let source = serde_json::from_str::<Vec<InstitutionRecord>>("{").unwrap_err();
                Err(SourceError::Parse { body: "{".to_owned(), source })
            },
            Reply::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(Vec::new())
            },
            Reply::Panic => panic!("source exploded"),
        }
    }
}

/// Records every alert instead of sending it.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self { messages: Mutex::default(), fail: true })
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_failure(&self, error: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(error.to_owned());
        if self.fail {
            return Err(NotifyError::Init("relay unavailable".to_owned()));
        }
        Ok(())
    }
}

pub(crate) fn pipeline(
    source: Arc<dyn InstitutionSource>,
    store: &MemoryStore,
    notifier: Arc<dyn Notifier>,
) -> SyncPipeline {
    SyncPipeline::new(source, Arc::new(store.clone()), notifier)
}
