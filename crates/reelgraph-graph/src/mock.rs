//! Scripted in-memory backend for tests.
//!
//! Replies are queued up front and handed out one per executed query; every
//! query the backend receives is recorded for later inspection. Compiled for
//! this crate's tests and for dependents enabling the `mock` feature.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::GraphBackend;
use crate::client::GraphError;
use crate::cypher::Query;
use crate::value::Record;

enum Reply {
    Rows(Vec<Record>),
    Fail(GraphError),
    Hang,
}

/// Backend that answers from a queue of scripted replies.
///
/// An exhausted queue answers with zero rows.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    seen: Mutex<Vec<Query>>,
    closed: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_rows(&self, rows: Vec<Record>) {
        lock(&self.replies).push_back(Reply::Rows(rows));
    }

    /// Queue a failing reply.
    pub fn push_error(&self, err: GraphError) {
        lock(&self.replies).push_back(Reply::Fail(err));
    }

    /// Queue a reply that never completes.
    pub fn push_hang(&self) {
        lock(&self.replies).push_back(Reply::Hang);
    }

    /// Every query received so far, sanitized parameters included.
    pub fn queries(&self) -> Vec<Query> {
        lock(&self.seen).clone()
    }

    pub fn last_query(&self) -> Option<Query> {
        lock(&self.seen).last().cloned()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphBackend for ScriptedBackend {
    async fn run(&self, query: Query) -> Result<Vec<Record>, GraphError> {
        lock(&self.seen).push(query);
        let reply = lock(&self.replies).pop_front();
        match reply {
            None => Ok(Vec::new()),
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Hang) => std::future::pending().await,
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
