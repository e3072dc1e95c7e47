pub mod core;
pub mod reserve;

use once_cell::sync;
use serde::{Deserialize, Serialize};
use snowflake::SnowflakeIdGenerator;
use std::{
    error::Error,
    fmt::{Debug, Display},
    hash::Hash,
    ops::Deref,
    str::FromStr,
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

pub trait Id:
    Clone
    + Eq
    + Hash
    + Deref<Target = Self::Inner>
    + From<Self::Inner>
    + Display
    + Debug
    + Serialize
    + for<'de> Deserialize<'de>
{
    type Inner: FromStr;
}

pub trait Entity: Debug + Clone {
    type Id: Id;

    const ENTITY_NAME: &'static str;

    fn id(&self) -> &Self::Id;
}

/// Failure reported by a collaborator (store or availability source)
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Database connection error: {0}")]
    ConnectionError(Box<dyn Error + Send + Sync>),
    #[error("Data write error: {0}")]
    WriteError(Box<dyn Error + Send + Sync>),
}

pub struct IdGenerator(SnowflakeIdGenerator);

impl IdGenerator {
    pub fn new(gen: SnowflakeIdGenerator) -> Self {
        Self(gen)
    }

    pub fn generate(&mut self) -> u64 {
        self.0.generate() as u64
    }
}

impl From<SnowflakeIdGenerator> for IdGenerator {
    fn from(value: SnowflakeIdGenerator) -> Self {
        Self::new(value)
    }
}

pub static ID_GENERATOR: sync::Lazy<IdGeneratorTask> =
    sync::Lazy::new(|| IdGeneratorTask::with_node(1, 1));

/// Hands out snowflake ids from a single background task
#[derive(Clone)]
pub struct IdGeneratorTask {
    _handle: Arc<JoinHandle<()>>,
    sender: mpsc::Sender<oneshot::Sender<u64>>,
}

impl IdGeneratorTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut gen: IdGenerator) -> Self {
        let (tx_async, mut rx_async) = mpsc::channel::<oneshot::Sender<u64>>(100);
        let handle = tokio::spawn(async move {
            while let Some(tx) = rx_async.recv().await {
                // the requester may have given up waiting
                let _ = tx.send(gen.generate());
            }
        });
        Self {
            _handle: Arc::new(handle),
            sender: tx_async,
        }
    }

    pub fn with_node(machine_id: i32, node_id: i32) -> Self {
        Self::spawn(SnowflakeIdGenerator::new(machine_id, node_id).into())
    }

    /// Returns `None` once the generator task has stopped.
    pub async fn generate<T>(&self) -> Option<T>
    where
        T: From<u64>,
    {
        let (tx, rx) = oneshot::channel::<u64>();
        self.sender.send(tx).await.ok()?;
        rx.await.ok().map(T::from)
    }
}
