//! Batched copy-on-write updates behind an immutable published snapshot.
//!
//! A [`Source`] owns the current snapshot of a tree and a bounded command
//! queue. Any number of callers may enqueue [`Command`]s concurrently while
//! readers keep working on the snapshot they loaded. A background task owns
//! the write side: on every tick of the update period, or when a flush is
//! requested, it copies the snapshot, applies exactly the commands queued at
//! that instant, and publishes the result.
//!
//! Writes are eventually visible: a [`Snapshot`] loaded before a drain pass
//! never changes, and a snapshot loaded after the pass sees every command in
//! the batch. Cancelling the source stops the task without draining, so
//! queued commands are lost unless [`Source::flush`] was awaited first.

use crate::assign::{assign, remove};
use crate::error::TreeError;
use crate::merge::merge;
use crate::navigate::navigate;
use crate::path::{IntoPath, Path};
use crate::value::TreeValue;
use crate::view::{Document, View};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default command queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

/// Default interval between periodic drain passes.
pub const DEFAULT_UPDATE_PERIOD: Duration = Duration::from_secs(1);

/// Queue fill ratio, in percent, from which every enqueue also asks for an
/// early flush.
const FLUSH_PRESSURE_PERCENT: usize = 70;

/// Configuration for a [`Source`].
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Maximum number of queued commands. Producers wait (or fail, for
    /// [`Source::try_send`]) beyond this.
    pub queue_capacity: usize,

    /// Interval between periodic drain passes.
    pub update_period: Duration,

    /// Cancelling this token stops the background task.
    pub cancellation: CancellationToken,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            update_period: DEFAULT_UPDATE_PERIOD,
            cancellation: CancellationToken::new(),
        }
    }
}

/// A queued mutation, addressed by absolute path.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Assign a value, creating missing nodes.
    Set { path: Path, value: TreeValue },
    /// Remove a node.
    Delete { path: Path },
    /// Merge a value over the node at `path`, or store it if absent.
    Merge { path: Path, value: TreeValue },
}

impl Command {
    pub fn path(&self) -> &Path {
        match self {
            Command::Set { path, .. } | Command::Delete { path } | Command::Merge { path, .. } => {
                path
            }
        }
    }

    /// Apply this command to `tree`.
    pub fn apply(self, tree: &mut TreeValue) -> Result<(), TreeError> {
        match self {
            Command::Set { path, value } => assign(tree, &path, value),
            Command::Delete { path } => remove(tree, &path).map(|_| ()),
            Command::Merge { path, value } => {
                let merged = match navigate(tree, &path) {
                    Ok(existing) => merge(existing, &value),
                    Err(_) => value,
                };
                assign(tree, &path, merged)
            }
        }
    }
}

/// A flush request, with an optional acknowledgement channel.
type FlushRequest = Option<oneshot::Sender<()>>;

/// Handle to a published tree and its update queue.
///
/// Cloning is cheap; all clones share the same snapshot and queue. The
/// background task stops when the cancellation token fires or when every
/// handle, including those held by snapshots and views, is dropped.
#[derive(Clone)]
pub struct Source {
    shared: Arc<Shared>,
}

struct Shared {
    snapshot: Arc<ArcSwap<TreeValue>>,
    commands: mpsc::Sender<Command>,
    flushes: mpsc::Sender<FlushRequest>,
    cancellation: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("queued", &self.queued())
            .field("capacity", &self.shared.commands.max_capacity())
            .field("cancelled", &self.shared.cancellation.is_cancelled())
            .finish()
    }
}

impl Source {
    /// Publish `initial` and start the background updater.
    ///
    /// # Panics
    ///
    /// If called outside a tokio runtime.
    pub fn new(initial: TreeValue, options: SourceOptions) -> Self {
        let capacity = options.queue_capacity.max(1);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let (flush_tx, flush_rx) = mpsc::channel((capacity / 10).max(1));
        let snapshot = Arc::new(ArcSwap::from_pointee(initial));

        let updater = Updater {
            snapshot: Arc::clone(&snapshot),
            commands: command_rx,
            flushes: flush_rx,
            period: options.update_period,
            cancellation: options.cancellation.clone(),
        };
        let task = tokio::spawn(updater.run());

        Source {
            shared: Arc::new(Shared {
                snapshot,
                commands: command_tx,
                flushes: flush_tx,
                cancellation: options.cancellation,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    /// Publish a deep copy of the subtree under `view`.
    pub fn from_view(view: &View<'_>, options: SourceOptions) -> Self {
        Source::new(view.value().clone(), options)
    }

    /// The currently published tree.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tree: self.shared.snapshot.load_full(),
            source: self.clone(),
        }
    }

    /// Number of commands waiting for the next drain pass.
    pub fn queued(&self) -> usize {
        self.shared.commands.max_capacity() - self.shared.commands.capacity()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.shared.cancellation
    }

    /// Queue an assignment at an absolute path.
    pub async fn set(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        self.send(Command::Set {
            path: path.into_path()?,
            value: value.into(),
        })
        .await
    }

    /// Queue removal of the node at an absolute path.
    pub async fn delete(&self, path: impl IntoPath) -> Result<(), TreeError> {
        self.send(Command::Delete {
            path: path.into_path()?,
        })
        .await
    }

    /// Queue a merge of `value` over the node at an absolute path.
    pub async fn merge(
        &self,
        path: impl IntoPath,
        value: impl Into<TreeValue>,
    ) -> Result<(), TreeError> {
        self.send(Command::Merge {
            path: path.into_path()?,
            value: value.into(),
        })
        .await
    }

    /// Enqueue a command, waiting while the queue is full.
    pub async fn send(&self, command: Command) -> Result<(), TreeError> {
        self.shared
            .commands
            .send(command)
            .await
            .map_err(|_| TreeError::SourceClosed)?;
        self.relieve_pressure();
        Ok(())
    }

    /// Enqueue a command without waiting.
    pub fn try_send(&self, command: Command) -> Result<(), TreeError> {
        self.shared.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TreeError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => TreeError::SourceClosed,
        })?;
        self.relieve_pressure();
        Ok(())
    }

    /// Enqueue a command from a thread that is not running async code.
    ///
    /// # Panics
    ///
    /// If called from within an async execution context.
    pub fn blocking_send(&self, command: Command) -> Result<(), TreeError> {
        self.shared
            .commands
            .blocking_send(command)
            .map_err(|_| TreeError::SourceClosed)?;
        self.relieve_pressure();
        Ok(())
    }

    /// Ask for an early drain pass without waiting for it.
    pub fn request_flush(&self) {
        let _ = self.shared.flushes.try_send(None);
    }

    /// Drain now and wait until every command queued before this call is
    /// applied and published.
    pub async fn flush(&self) -> Result<(), TreeError> {
        let (ack, done) = oneshot::channel();
        self.shared
            .flushes
            .send(Some(ack))
            .await
            .map_err(|_| TreeError::SourceClosed)?;
        done.await.map_err(|_| TreeError::SourceClosed)
    }

    /// Cancel the background task and wait for it to stop. Commands still
    /// queued are discarded.
    pub async fn shutdown(&self) {
        self.shared.cancellation.cancel();
        let task = self
            .shared
            .task
            .lock()
            .ok()
            .and_then(|mut task| task.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Snapshot updater task failed");
            }
        }
    }

    fn relieve_pressure(&self) {
        let capacity = self.shared.commands.max_capacity();
        if self.queued() * 100 >= capacity * FLUSH_PRESSURE_PERCENT {
            self.request_flush();
        }
    }
}

/// One published version of the tree.
///
/// Holding a snapshot keeps that version alive; it never observes later
/// drain passes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    tree: Arc<TreeValue>,
    source: Source,
}

impl Snapshot {
    pub fn tree(&self) -> &TreeValue {
        &self.tree
    }

    /// A view whose `set` calls are queued on the owning source.
    pub fn view(&self) -> View<'_> {
        View::attached(&self.tree, self.source.clone())
    }

    /// An owned copy, detached from the source.
    pub fn to_document(&self) -> Document {
        Document::new(TreeValue::clone(&self.tree))
    }

    pub fn source(&self) -> &Source {
        &self.source
    }
}

/// The background task: sole writer of the published snapshot.
struct Updater {
    snapshot: Arc<ArcSwap<TreeValue>>,
    commands: mpsc::Receiver<Command>,
    flushes: mpsc::Receiver<FlushRequest>,
    period: Duration,
    cancellation: CancellationToken,
}

impl Updater {
    async fn run(self) {
        let Updater {
            snapshot,
            mut commands,
            mut flushes,
            period,
            cancellation,
        } = self;

        info!(period_ms = period.as_millis() as u64, "Snapshot updater started");
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = cancellation.cancelled() => {
                    info!(discarded = commands.len(), "Snapshot updater cancelled");
                    return;
                }

                request = flushes.recv() => {
                    let Some(first) = request else {
                        debug!("All source handles dropped, stopping snapshot updater");
                        return;
                    };
                    // Requests already waiting are served by the same pass.
                    let mut requests = vec![first];
                    while let Ok(request) = flushes.try_recv() {
                        requests.push(request);
                    }
                    drain(&snapshot, &mut commands);
                    for ack in requests.into_iter().flatten() {
                        let _ = ack.send(());
                    }
                }

                _ = ticker.tick() => {
                    drain(&snapshot, &mut commands);
                }
            }
        }
    }
}

/// One drain pass: copy, apply the commands queued right now, publish.
fn drain(snapshot: &ArcSwap<TreeValue>, commands: &mut mpsc::Receiver<Command>) {
    let batch = commands.len();
    if batch == 0 {
        return;
    }

    let mut working = TreeValue::clone(&snapshot.load());
    let mut failed = 0usize;
    for _ in 0..batch {
        let Ok(command) = commands.try_recv() else {
            break;
        };
        let path = command.path().clone();
        if let Err(e) = command.apply(&mut working) {
            failed += 1;
            warn!(path = %path, error = %e, "Dropping command that failed to apply");
        }
    }
    snapshot.store(Arc::new(working));
    debug!(batch, failed, "Published new snapshot");
}
