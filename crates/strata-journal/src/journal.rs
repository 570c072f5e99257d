use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use strata_store::{Contents, Depot, ObjectBlock};
use strata_types::{Address, ContentId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::transcript::{Action, Transcript};
use crate::wal::{SyncMode, WalEntry, WriteAheadLog};

/// Configuration for the [`Journal`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// WAL segment file. `None` keeps recorded transcripts in memory only.
    pub wal_path: Option<PathBuf>,
    pub sync_mode: SyncMode,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Most transcripts allowed to await application at once. `None` is
    /// unbounded.
    pub max_pending: Option<usize>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            wal_path: None,
            sync_mode: SyncMode::default(),
            event_capacity: 1024,
            max_pending: None,
        }
    }
}

/// Outcome of [`Journal::record`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recorded {
    /// The transcript was empty; nothing was queued.
    Ignored,
    /// The transcript was queued under this sequence number.
    Queued(u64),
}

/// State of an object as seen through transcripts not yet applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Retrieved {
    Block(ObjectBlock),
    /// The object is scheduled for deletion.
    Wiped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed(String),
}

/// Broadcast once per transcript after the worker has processed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalEvent {
    pub seq: u64,
    pub tag: u64,
    pub outcome: Outcome,
    pub pushes: usize,
    pub wipes: usize,
}

enum Message {
    Apply(WalEntry),
    Flush(oneshot::Sender<()>),
    Close,
}

#[derive(Default)]
struct Pending {
    objects: HashMap<Address, (u64, Retrieved)>,
    contents: HashMap<ContentId, (u64, Contents)>,
    outstanding: BTreeSet<u64>,
    /// Transcripts the depot refused. They outlive every checkpoint.
    failed: BTreeMap<u64, WalEntry>,
}

impl Pending {
    fn insert(&mut self, seq: u64, transcript: &Transcript) {
        for action in transcript.iter() {
            match action {
                Action::PushContents { id, contents } => {
                    self.contents.insert(*id, (seq, contents.clone()));
                }
                Action::PushObject { address, block } => {
                    self.objects
                        .insert(*address, (seq, Retrieved::Block(block.clone())));
                }
                Action::Wipe { address } => {
                    self.objects.insert(*address, (seq, Retrieved::Wiped));
                }
            }
        }
        self.outstanding.insert(seq);
    }

    /// Forget everything recorded under `seq` that a later transcript has
    /// not superseded.
    fn settle(&mut self, seq: u64) {
        self.objects.retain(|_, (s, _)| *s != seq);
        self.contents.retain(|_, (s, _)| *s != seq);
        self.outstanding.remove(&seq);
    }
}

/// State shared between journal handles and the background worker.
struct Shared {
    depot: Arc<dyn Depot>,
    pending: Mutex<Pending>,
    wal: Option<WriteAheadLog>,
    events: broadcast::Sender<JournalEvent>,
}

struct Inner {
    shared: Arc<Shared>,
    sender: mpsc::UnboundedSender<Message>,
    next_seq: AtomicU64,
    max_pending: Option<usize>,
    closed: AtomicBool,
}

/// Durability pipeline for closed objects.
///
/// [`record`](Journal::record) is fire-and-forget: the transcript is made
/// durable in the WAL, made visible to [`retrieve`](Journal::retrieve), and
/// queued for a background worker that applies it to the depot. Content
/// pushes are applied before object pushes, and wipes last. Once everything
/// recorded has been applied the WAL is checkpointed: emptied of everything
/// except the transcripts the depot refused, which the next
/// [`start`](Journal::start) replays.
#[derive(Clone)]
pub struct Journal {
    inner: Arc<Inner>,
}

impl Journal {
    /// Start a journal over `depot` and spawn its worker.
    ///
    /// Transcripts left unapplied in the WAL by a previous run are replayed
    /// first. Must be called from within a Tokio runtime.
    pub fn start(depot: Arc<dyn Depot>, config: JournalConfig) -> Result<Self> {
        let wal = match &config.wal_path {
            Some(path) => Some(WriteAheadLog::open(path, config.sync_mode)?),
            None => None,
        };
        let recovered = match &wal {
            Some(wal) => wal.recover()?,
            None => Vec::new(),
        };

        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let shared = Arc::new(Shared {
            depot,
            pending: Mutex::new(Pending::default()),
            wal,
            events,
        });
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run(Arc::clone(&shared), receiver));

        let next_seq = recovered.iter().map(|e| e.seq).max().map_or(1, |s| s + 1);
        if !recovered.is_empty() {
            info!(entries = recovered.len(), "replaying unapplied transcripts");
        }
        {
            let mut pending = shared.pending.lock().expect("pending lock poisoned");
            for entry in &recovered {
                pending.insert(entry.seq, &entry.transcript);
            }
        }
        for entry in recovered {
            sender
                .send(Message::Apply(entry))
                .map_err(|_| JournalError::Closed)?;
        }

        info!(wal = config.wal_path.is_some(), "journal started");
        Ok(Self {
            inner: Arc::new(Inner {
                shared,
                sender,
                next_seq: AtomicU64::new(next_seq),
                max_pending: config.max_pending,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Hand a transcript to the journal.
    ///
    /// Empty transcripts are ignored. Fails if the journal is closed, if
    /// `max_pending` transcripts are already waiting, or if the WAL append
    /// fails. A failed record leaves no trace.
    pub fn record(&self, tag: u64, transcript: &Transcript) -> Result<Recorded> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(JournalError::Closed);
        }
        if transcript.is_empty() {
            debug!(tag, "ignoring empty transcript");
            return Ok(Recorded::Ignored);
        }

        let seq;
        let entry;
        {
            let shared = &self.inner.shared;
            let mut pending = shared.pending.lock().expect("pending lock poisoned");
            if let Some(limit) = self.inner.max_pending {
                if pending.outstanding.len() >= limit {
                    debug!(tag, limit, "journal saturated");
                    return Err(JournalError::Saturated { limit });
                }
            }
            seq = self.inner.next_seq.fetch_add(1, Ordering::AcqRel);
            entry = WalEntry {
                seq,
                tag,
                transcript: transcript.clone(),
            };
            if let Some(wal) = &shared.wal {
                wal.append(&entry)?;
            }
            pending.insert(seq, transcript);
        }

        if self.inner.sender.send(Message::Apply(entry)).is_err() {
            self.inner
                .shared
                .pending
                .lock()
                .expect("pending lock poisoned")
                .settle(seq);
            return Err(JournalError::Closed);
        }

        debug!(
            seq,
            tag,
            pushes = transcript.pushes(),
            wipes = transcript.wipes(),
            "transcript recorded"
        );
        Ok(Recorded::Queued(seq))
    }

    /// Object state recorded but not yet applied to the depot, if any.
    pub fn retrieve(&self, address: &Address) -> Option<Retrieved> {
        self.inner
            .shared
            .pending
            .lock()
            .expect("pending lock poisoned")
            .objects
            .get(address)
            .map(|(_, retrieved)| retrieved.clone())
    }

    /// Content block recorded but not yet applied to the depot, if any.
    pub fn retrieve_contents(&self, id: &ContentId) -> Option<Contents> {
        self.inner
            .shared
            .pending
            .lock()
            .expect("pending lock poisoned")
            .contents
            .get(id)
            .map(|(_, contents)| contents.clone())
    }

    /// Number of recorded transcripts not yet applied.
    pub fn pending_count(&self) -> usize {
        self.inner
            .shared
            .pending
            .lock()
            .expect("pending lock poisoned")
            .outstanding
            .len()
    }

    /// Number of transcripts the depot refused during this run.
    pub fn failed_count(&self) -> usize {
        self.inner
            .shared
            .pending
            .lock()
            .expect("pending lock poisoned")
            .failed
            .len()
    }

    /// Wait until every transcript recorded so far has been processed.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .sender
            .send(Message::Flush(tx))
            .map_err(|_| JournalError::Closed)?;
        rx.await.map_err(|_| JournalError::Closed)
    }

    /// Subscribe to per-transcript outcomes.
    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.inner.shared.events.subscribe()
    }

    /// Refuse further transcripts. Already queued ones are still applied.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            let _ = self.inner.sender.send(Message::Close);
            info!("journal closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn depot(&self) -> &Arc<dyn Depot> {
        &self.inner.shared.depot
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn run(shared: Arc<Shared>, mut receiver: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = receiver.recv().await {
        match message {
            Message::Apply(entry) => apply(&shared, entry).await,
            Message::Flush(reply) => {
                let _ = reply.send(());
            }
            Message::Close => break,
        }
    }
    debug!("journal worker stopped");
}

async fn apply(shared: &Shared, entry: WalEntry) {
    let (seq, tag) = (entry.seq, entry.tag);
    let outcome = match push(shared.depot.as_ref(), &entry.transcript).await {
        Ok(()) => {
            debug!(seq, tag, "transcript applied");
            Outcome::Applied
        }
        Err(e) => {
            warn!(seq, tag, error = %e, "transcript failed to apply");
            Outcome::Failed(e.to_string())
        }
    };

    let (pushes, wipes) = (entry.transcript.pushes(), entry.transcript.wipes());
    {
        let mut pending = shared.pending.lock().expect("pending lock poisoned");
        pending.settle(seq);
        if matches!(outcome, Outcome::Failed(_)) {
            pending.failed.insert(seq, entry);
        }
        if pending.outstanding.is_empty() {
            if let Some(wal) = &shared.wal {
                if let Err(e) = checkpoint(wal, pending.failed.values()) {
                    warn!(error = %e, "WAL checkpoint failed");
                }
            }
        }
    }

    let _ = shared.events.send(JournalEvent {
        seq,
        tag,
        outcome,
        pushes,
        wipes,
    });
}

/// Empty the WAL, keeping only the refused transcripts for the next start.
fn checkpoint<'a>(
    wal: &WriteAheadLog,
    refused: impl Iterator<Item = &'a WalEntry>,
) -> Result<()> {
    wal.truncate()?;
    for entry in refused {
        wal.append(entry)?;
    }
    Ok(())
}

async fn push(depot: &dyn Depot, transcript: &Transcript) -> strata_store::DepotResult<()> {
    for action in transcript.iter() {
        if let Action::PushContents { contents, .. } = action {
            depot.push_contents(contents).await?;
        }
    }
    for action in transcript.iter() {
        if let Action::PushObject { address, block } = action {
            depot.push_object(*address, block.clone()).await?;
        }
    }
    for action in transcript.iter() {
        if let Action::Wipe { address } = action {
            depot.wipe_object(address).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::InMemoryDepot;
    use strata_types::{Genre, Location, Subject};

    fn store_transcript(address: Address, revision: u64, data: &[u8]) -> Transcript {
        let contents = Contents::File(data.to_vec());
        let id = contents.id().unwrap();
        let mut block = ObjectBlock::new(Genre::File, Subject::from_public_key(&[1u8; 32]));
        block.revision = revision;
        block.contents = Some(id);
        block.size = data.len() as u64;
        let mut transcript = Transcript::new();
        transcript.record(Action::PushContents { id, contents });
        transcript.record(Action::PushObject { address, block });
        transcript
    }

    // -----------------------------------------------------------------------
    // Recording and applying
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_transcript_is_ignored() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot, JournalConfig::default()).unwrap();
        assert_eq!(
            journal.record(1, &Transcript::new()).unwrap(),
            Recorded::Ignored
        );
        assert_eq!(journal.pending_count(), 0);
    }

    #[tokio::test]
    async fn recorded_transcript_reaches_depot() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot.clone(), JournalConfig::default()).unwrap();
        let address = Address::generate();

        let recorded = journal
            .record(7, &store_transcript(address, 1, b"hello"))
            .unwrap();
        assert_eq!(recorded, Recorded::Queued(1));
        journal.flush().await.unwrap();

        let block = depot.pull_object(&Location::latest(address)).await.unwrap();
        assert_eq!(block.revision, 1);
        assert_eq!(journal.pending_count(), 0);
    }

    #[tokio::test]
    async fn pending_state_visible_until_applied() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot, JournalConfig::default()).unwrap();
        let address = Address::generate();
        let transcript = store_transcript(address, 1, b"pending");

        // Nothing yields between record and retrieve on the current-thread runtime.
        journal.record(1, &transcript).unwrap();
        assert!(matches!(journal.retrieve(&address), Some(Retrieved::Block(_))));
        let id = ContentId::derive(&Contents::File(b"pending".to_vec()).encode().unwrap());
        assert!(journal.retrieve_contents(&id).is_some());

        journal.flush().await.unwrap();
        assert_eq!(journal.retrieve(&address), None);
    }

    #[tokio::test]
    async fn wipe_is_retrieved_as_wiped() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot.clone(), JournalConfig::default()).unwrap();
        let address = Address::generate();
        journal.record(1, &store_transcript(address, 1, b"x")).unwrap();

        let mut wipe = Transcript::new();
        wipe.record(Action::Wipe { address });
        journal.record(2, &wipe).unwrap();
        assert_eq!(journal.retrieve(&address), Some(Retrieved::Wiped));

        journal.flush().await.unwrap();
        assert!(depot.pull_object(&Location::latest(address)).await.is_err());
    }

    #[tokio::test]
    async fn events_report_outcomes() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot, JournalConfig::default()).unwrap();
        let mut events = journal.subscribe();
        let address = Address::generate();

        journal.record(5, &store_transcript(address, 2, b"a")).unwrap();
        // Stale revision: the depot refuses it.
        journal.record(6, &store_transcript(address, 1, b"b")).unwrap();
        journal.flush().await.unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.tag, 5);
        assert_eq!(first.outcome, Outcome::Applied);
        assert_eq!(first.pushes, 2);

        let second = events.recv().await.unwrap();
        assert_eq!(second.tag, 6);
        assert!(matches!(second.outcome, Outcome::Failed(_)));
    }

    #[tokio::test]
    async fn saturated_journal_refuses_until_drained() {
        let depot = Arc::new(InMemoryDepot::new());
        let config = JournalConfig {
            max_pending: Some(1),
            ..JournalConfig::default()
        };
        let journal = Journal::start(depot, config).unwrap();

        journal
            .record(1, &store_transcript(Address::generate(), 1, b"a"))
            .unwrap();
        let address = Address::generate();
        let err = journal
            .record(2, &store_transcript(address, 1, b"b"))
            .unwrap_err();
        assert!(matches!(err, JournalError::Saturated { limit: 1 }));
        assert_eq!(journal.retrieve(&address), None);
        assert_eq!(journal.pending_count(), 1);

        journal.flush().await.unwrap();
        assert_eq!(
            journal.record(2, &store_transcript(address, 1, b"b")).unwrap(),
            Recorded::Queued(2)
        );
    }

    // -----------------------------------------------------------------------
    // Closing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn closed_journal_rejects_records() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot, JournalConfig::default()).unwrap();
        journal.close();
        assert!(journal.is_closed());
        let err = journal
            .record(1, &store_transcript(Address::generate(), 1, b"x"))
            .unwrap_err();
        assert!(matches!(err, JournalError::Closed));
    }

    #[tokio::test]
    async fn close_still_applies_queued_transcripts() {
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot.clone(), JournalConfig::default()).unwrap();
        let address = Address::generate();
        journal.record(1, &store_transcript(address, 1, b"x")).unwrap();
        let mut events = journal.subscribe();
        journal.close();

        assert_eq!(events.recv().await.unwrap().outcome, Outcome::Applied);
        assert!(depot.pull_object(&Location::latest(address)).await.is_ok());
    }

    // -----------------------------------------------------------------------
    // WAL recovery
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wal_is_checkpointed_once_idle() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig {
            wal_path: Some(dir.path().join("journal.wal")),
            ..JournalConfig::default()
        };
        let depot = Arc::new(InMemoryDepot::new());
        let journal = Journal::start(depot, config.clone()).unwrap();
        journal
            .record(1, &store_transcript(Address::generate(), 1, b"x"))
            .unwrap();
        journal.flush().await.unwrap();

        let wal = WriteAheadLog::open(config.wal_path.as_deref().unwrap(), SyncMode::default())
            .unwrap();
        assert!(wal.recover().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unapplied_transcripts_are_replayed_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let wal_path = dir.path().join("journal.wal");
        let address = Address::generate();

        // Simulate a crash: the entry reached the WAL but was never applied.
        {
            let wal = WriteAheadLog::open(&wal_path, SyncMode::default()).unwrap();
            wal.append(&WalEntry {
                seq: 41,
                tag: 3,
                transcript: store_transcript(address, 1, b"survivor"),
            })
            .unwrap();
        }

        let depot = Arc::new(InMemoryDepot::new());
        let config = JournalConfig {
            wal_path: Some(wal_path),
            ..JournalConfig::default()
        };
        let journal = Journal::start(depot.clone(), config).unwrap();
        journal.flush().await.unwrap();
        assert!(depot.pull_object(&Location::latest(address)).await.is_ok());

        // Sequence numbers continue past the replayed ones.
        let next = journal
            .record(4, &store_transcript(Address::generate(), 1, b"next"))
            .unwrap();
        assert_eq!(next, Recorded::Queued(42));
    }

    #[tokio::test]
    async fn refused_transcript_survives_in_wal() {
        let dir = tempfile::tempdir().unwrap();
        let wal_path = dir.path().join("journal.wal");
        let config = JournalConfig {
            wal_path: Some(wal_path.clone()),
            ..JournalConfig::default()
        };
        let depot = Arc::new(InMemoryDepot::new());
        let address = Address::generate();
        let journal = Journal::start(depot, config).unwrap();

        journal.record(1, &store_transcript(address, 2, b"a")).unwrap();
        // Stale revision: the depot refuses it.
        let refused = journal.record(2, &store_transcript(address, 1, b"b")).unwrap();
        journal.flush().await.unwrap();
        journal
            .record(3, &store_transcript(Address::generate(), 1, b"c"))
            .unwrap();
        journal.flush().await.unwrap();

        assert_eq!(journal.pending_count(), 0);
        assert_eq!(journal.failed_count(), 1);
        let wal = WriteAheadLog::open(&wal_path, SyncMode::default()).unwrap();
        let seqs: Vec<u64> = wal.recover().unwrap().iter().map(|e| e.seq).collect();
        assert_eq!(refused, Recorded::Queued(2));
        assert_eq!(seqs, vec![2]);
    }
}
