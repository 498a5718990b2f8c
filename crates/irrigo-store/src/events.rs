//! System event recording.
//!
//! Each event is appended to the month's system log, traced, and forwarded
//! to the notifier in bounded chunks.

use std::io::Write;

use tracing::{debug, error, info, warn};

use irrigo_types::{Severity, SystemEvent};

use crate::clock::epoch_seconds;
use crate::error::{Error, Result};
use crate::models::system_line_prefix;
use crate::notifier::EventNotifier;
use crate::schema;
use crate::settings::ControllerSettings;
use crate::store::Logger;

/// Default capacity of the event staging buffer, in bytes.
pub const DEFAULT_MAX_EVENT_PAYLOAD: usize = 256;

/// Default size of one notifier chunk, in bytes.
pub const DEFAULT_EVENT_CHUNK_SIZE: usize = 63;

/// Smallest chunk size accepted; any UTF-8 character fits.
const MIN_EVENT_CHUNK_SIZE: usize = 4;

/// Bounds on how a system event is forwarded to the notifier.
///
/// The staging buffer is flushed to the notifier each time it fills, so a
/// chunk never exceeds the buffer capacity nor the configured chunk size.
/// The message itself is never shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStaging {
    capacity: usize,
    chunk_size: usize,
}

impl Default for EventStaging {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENT_PAYLOAD, DEFAULT_EVENT_CHUNK_SIZE)
    }
}

impl EventStaging {
    pub fn new(capacity: usize, chunk_size: usize) -> Self {
        Self {
            capacity,
            chunk_size: chunk_size.min(capacity).max(MIN_EVENT_CHUNK_SIZE),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest chunk handed to the notifier, in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into ordered chunks of at most `chunk_size` bytes.
    ///
    /// Each item carries the continuation flag: true for every chunk except
    /// the last. Nothing is yielded for empty text.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            rest: text,
            size: self.chunk_size,
        }
    }
}

/// Iterator over event chunks. See [`EventStaging::chunks`].
#[derive(Debug)]
pub struct Chunks<'a> {
    rest: &'a str,
    size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = (&'a str, bool);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let end = floor_char_boundary(self.rest, self.size);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some((chunk, !rest.is_empty()))
    }
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

impl<S: ControllerSettings, N: EventNotifier> Logger<S, N> {
    /// Record a system event.
    ///
    /// The line `D,H:Min:Sec,code,message` is appended to the current
    /// month's system log. The message alone is then traced and delivered
    /// to the notifier in full, chunk by chunk.
    ///
    /// When the store is not ready the line is not written, but the event
    /// is still traced and delivered before `StoreNotReady` is returned.
    /// A failure to open or write the partition returns the error without
    /// tracing or delivery. A failed open also closes the store.
    pub fn record_system_event(&mut self, severity: Severity, message: &str) -> Result<()> {
        let now = self.now();
        let message = message.trim_end_matches(['\r', '\n']);

        let persisted = self.persist_event_line(now, severity, message);
        if let Err(err) = &persisted
            && !matches!(err, Error::StoreNotReady)
        {
            debug!("System event not delivered: {}", err);
            return persisted;
        }

        match severity.routed() {
            Severity::Crit | Severity::Error => error!("SYSEVT-{}: {}", severity.routed(), message),
            Severity::Warning => warn!("SYSEVT-{}: {}", severity.routed(), message),
            _ => info!("SYSEVT-{}: {}", severity.routed(), message),
        }

        let timestamp = epoch_seconds(now);
        for (payload, continuation) in self.staging.chunks(message) {
            self.notifier.deliver_system_event(&SystemEvent {
                severity,
                timestamp,
                continuation,
                payload: payload.to_string(),
            });
        }

        persisted
    }

    fn persist_event_line(
        &mut self,
        now: time::PrimitiveDateTime,
        severity: Severity,
        message: &str,
    ) -> Result<()> {
        if !self.store.is_ready() {
            return Err(Error::StoreNotReady);
        }

        let path = schema::system_log_path(self.store.root(), u8::from(now.month()), now.year());
        let mut file = match self.store.append_partition(&path, None) {
            Ok(file) => file,
            Err(err) => {
                self.store.close();
                return Err(err);
            }
        };
        writeln!(file, "{}{}", system_line_prefix(now, severity), message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::settings::StationSettings;
    use crate::store::LogStore;
    use proptest::prelude::*;
    use time::macros::datetime;

    fn logger(
        root: &std::path::Path,
    ) -> Logger<StationSettings, Vec<SystemEvent>> {
        Logger::new(LogStore::new(root), StationSettings::default(), Vec::new())
            .with_clock(ManualClock::new(datetime!(2024-03-05 7:08:09)))
    }

    #[test]
    fn test_chunks_flag_continuation() {
        let staging = EventStaging::new(256, 4);
        let chunks: Vec<_> = staging.chunks("abcdefghij").collect();
        assert_eq!(chunks, vec![("abcd", true), ("efgh", true), ("ij", false)]);
    }

    #[test]
    fn test_chunks_never_split_characters() {
        let staging = EventStaging::new(256, 5);
        let chunks: Vec<_> = staging.chunks("abcdé").collect();
        // 'é' is two bytes and would end at byte 6
        assert_eq!(chunks, vec![("abcd", true), ("é", false)]);
    }

    #[test]
    fn test_single_chunk_is_final() {
        let staging = EventStaging::default();
        let chunks: Vec<_> = staging.chunks("short").collect();
        assert_eq!(chunks, vec![("short", false)]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert_eq!(EventStaging::default().chunks("").count(), 0);
    }

    #[test]
    fn test_chunk_size_is_clamped() {
        assert_eq!(EventStaging::new(16, 0).chunk_size(), MIN_EVENT_CHUNK_SIZE);
        assert_eq!(EventStaging::new(16, 63).chunk_size(), 16);
        assert_eq!(EventStaging::default().chunk_size(), DEFAULT_EVENT_CHUNK_SIZE);
    }

    #[test]
    fn test_record_writes_system_log_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();

        logger.record_system_event(Severity::Notice, "Zone 3 started\n").unwrap();

        let text = std::fs::read_to_string(dir.path().join("logs/sys-03-2024.log")).unwrap();
        assert_eq!(text, "5,7:8:9,5,Zone 3 started\n");

        let delivered = logger.notifier();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].payload, "Zone 3 started");
        assert_eq!(delivered[0].severity, Severity::Notice);
        assert_eq!(delivered[0].timestamp, epoch_seconds(datetime!(2024-03-05 7:08:09)));
        assert!(!delivered[0].continuation);
    }

    #[test]
    fn test_message_longer_than_buffer_is_delivered_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();

        let message = "y".repeat(400);
        logger.record_system_event(Severity::Notice, &message).unwrap();

        let delivered = logger.notifier();
        let payload: String = delivered.iter().map(|e| e.payload.as_str()).collect();
        assert_eq!(payload, message);
        assert_eq!(delivered.len(), 7);
        assert!(delivered.iter().all(|e| e.payload.len() <= DEFAULT_EVENT_CHUNK_SIZE));
    }

    #[test]
    fn test_not_ready_still_delivers() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());

        let err = logger.record_system_event(Severity::Crit, "Sensor bus fault").unwrap_err();
        assert!(matches!(err, Error::StoreNotReady));
        assert_eq!(logger.notifier().len(), 1);
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn test_open_failure_closes_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path());
        logger.begin().unwrap();
        std::fs::remove_dir(dir.path().join("logs")).unwrap();

        let err = logger.record_system_event(Severity::Error, "lost").unwrap_err();
        assert!(matches!(err, Error::FileOpen { .. }));
        assert!(!logger.is_ready());
        assert!(logger.notifier().is_empty());
    }

    #[test]
    fn test_long_event_is_chunked() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = logger(dir.path()).with_event_limits(256, 10);
        logger.begin().unwrap();

        logger.record_system_event(Severity::Info, "0123456789abcdef").unwrap();

        let delivered = logger.notifier();
        let payload: String = delivered.iter().map(|e| e.payload.as_str()).collect();
        assert_eq!(payload, "0123456789abcdef");
        assert!(delivered.len() > 1);
        assert!(delivered[..delivered.len() - 1].iter().all(|e| e.continuation));
        assert!(!delivered[delivered.len() - 1].continuation);
    }

    proptest! {
        #[test]
        fn prop_chunks_reassemble_whole_message(
            text in "\\PC{0,400}",
            capacity in 0usize..200,
            chunk_size in 0usize..80,
        ) {
            let staging = EventStaging::new(capacity, chunk_size);
            let chunks: Vec<_> = staging.chunks(&text).collect();

            let joined: String = chunks.iter().map(|(c, _)| *c).collect();
            prop_assert_eq!(joined.as_str(), text.as_str());
            for (index, (chunk, continuation)) in chunks.iter().enumerate() {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.len() <= staging.chunk_size());
                prop_assert_eq!(*continuation, index + 1 < chunks.len());
            }
        }
    }
}
