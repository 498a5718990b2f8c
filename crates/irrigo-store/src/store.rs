//! Log store lifecycle and the engine facade.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::PrimitiveDateTime;
use tracing::{debug, error, info, warn};

use irrigo_types::LogCategory;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::events::EventStaging;
use crate::notifier::{EventNotifier, NullNotifier};
use crate::queries::QueryEngine;
use crate::schema;
use crate::settings::ControllerSettings;

/// Partitioned log directory tree with a readiness flag.
///
/// Writes are refused while the store is not ready. Reads never consult the
/// flag, so existing partitions stay queryable after a setup failure.
#[derive(Debug)]
pub struct LogStore {
    root: PathBuf,
    ready: bool,
}

impl LogStore {
    /// A store rooted at `root`. It is not ready until [`LogStore::begin`] succeeds.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            ready: false,
        }
    }

    /// A store at the default location.
    pub fn open_default() -> Self {
        Self::new(crate::default_log_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Ensure every category directory exists, creating missing ones.
    ///
    /// Safe to call repeatedly. On failure the store is marked not ready and
    /// the first failure is returned; the caller may carry on regardless.
    pub fn begin(&mut self) -> Result<()> {
        let mut first_error = None;

        for category in LogCategory::ALL {
            let dir = schema::category_dir(&self.root, category);
            if dir.is_dir() {
                continue;
            }

            info!("{} log directory not found, creating {}", category, dir.display());
            if let Err(source) = fs::create_dir_all(&dir) {
                error!("Error creating {} log directory {}: {}", category, dir.display(), source);
                first_error.get_or_insert(Error::CreateDirectory { path: dir, source });
            }
        }

        self.ready = first_error.is_none();
        match first_error {
            None => {
                debug!("Log store ready at {}", self.root.display());
                Ok(())
            }
            Some(err) => Err(err),
        }
    }

    /// Mark the store not ready. Subsequent writes fail with [`Error::StoreNotReady`].
    pub fn close(&mut self) {
        if self.ready {
            info!("Closing log store at {}", self.root.display());
        }
        self.ready = false;
    }

    /// Open a partition for appending.
    ///
    /// If the plain open fails the file is created and `header` is written
    /// first. Fails with [`Error::FileOpen`] when creation fails too.
    pub(crate) fn append_partition(&self, path: &Path, header: Option<&str>) -> Result<File> {
        if let Ok(file) = OpenOptions::new().append(true).open(path) {
            return Ok(file);
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| {
                error!("Cannot open or create log file {}: {}", path.display(), source);
                Error::FileOpen {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        if let Some(header) = header {
            file.write_all(header.as_bytes())?;
        }
        info!("Created log file {}", path.display());
        Ok(file)
    }
}

/// Open a partition for reading. Missing or unreadable files read as absent.
pub(crate) fn open_partition(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// The log engine: one store, its settings provider, notifier and clock.
///
/// All writers and queries run to completion on the caller's thread. The
/// caller must not use the same partitions from another engine at the same
/// time; there is no locking.
pub struct Logger<S, N = NullNotifier> {
    pub(crate) store: LogStore,
    pub(crate) settings: S,
    pub(crate) notifier: N,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) staging: EventStaging,
}

impl<S: ControllerSettings, N: EventNotifier> Logger<S, N> {
    /// Create an engine using the system clock and default event limits.
    pub fn new(store: LogStore, settings: S, notifier: N) -> Self {
        Self {
            store,
            settings,
            notifier,
            clock: Box::new(SystemClock),
            staging: EventStaging::default(),
        }
    }

    /// Replace the clock.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the staging buffer capacity and the notifier chunk size, in bytes.
    pub fn with_event_limits(mut self, max_payload: usize, chunk_size: usize) -> Self {
        self.staging = EventStaging::new(max_payload, chunk_size);
        self
    }

    /// Ensure the directory tree. See [`LogStore::begin`].
    pub fn begin(&mut self) -> Result<()> {
        self.store.begin()
    }

    /// Stop accepting writes.
    pub fn close(&mut self) {
        self.store.close()
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Consume the engine, returning its store, settings and notifier.
    pub fn into_parts(self) -> (LogStore, S, N) {
        (self.store, self.settings, self.notifier)
    }

    /// Query engine over this store's partitions.
    pub fn queries(&self) -> QueryEngine {
        QueryEngine::new(self.store.root(), self.settings.number_of_zones())
    }

    /// Current controller time according to the engine's clock.
    pub fn now(&self) -> PrimitiveDateTime {
        self.clock.now()
    }
}

impl<S, N> std::fmt::Debug for Logger<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("store", &self.store)
            .field("staging", &self.staging)
            .finish_non_exhaustive()
    }
}
