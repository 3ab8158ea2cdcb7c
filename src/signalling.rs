//! Synthetic AIT signalling.
//!
//! On a real terminal the AIT arrives from the broadcast network. Here the
//! [`AitScenario`] synthesises one section per tune from the configured
//! application list and hands it to an [`AitSink`], which plays the role of
//! the terminal's section filter.

use orb_ait::{AitError, AitVersion, Application, encode_section};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consumer of encoded AIT sections.
pub trait AitSink: Send + Sync {
    fn process_ait_section(&self, pid: u16, service_id: u16, section: &[u8]);
}

/// Owns the table version and PID for a synthetic AIT.
pub struct AitScenario {
    pid: u16,
    version: Mutex<AitVersion>,
    sink: Arc<dyn AitSink>,
}

impl AitScenario {
    pub fn new(pid: u16, sink: Arc<dyn AitSink>) -> Self {
        Self {
            pid,
            version: Mutex::new(AitVersion::default()),
            sink,
        }
    }

    /// Version the next published section will carry.
    pub fn next_version(&self) -> AitVersion {
        *self.version.lock()
    }

    /// Encode `applications` for `service_id` and deliver the section.
    ///
    /// The version advances only when encoding succeeds; a rejected
    /// application list leaves it unchanged and delivers nothing.
    pub fn publish(&self, service_id: u16, applications: &[Application]) -> Result<AitVersion, AitError> {
        let mut version = self.version.lock();
        let section = match encode_section(applications, *version) {
            Ok(section) => section,
            Err(e) => {
                warn!(service_id, error = %e, "AIT synthesis rejected");
                crate::metrics::record_ait_section("rejected");
                return Err(e);
            }
        };
        let published = *version;
        *version = published.next();
        drop(version);

        debug!(
            pid = self.pid,
            service_id,
            version = %published,
            len = section.len(),
            apps = applications.len(),
            "AIT section synthesised"
        );
        crate::metrics::record_ait_section("encoded");
        self.sink.process_ait_section(self.pid, service_id, &section);
        Ok(published)
    }
}

impl std::fmt::Debug for AitScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AitScenario")
            .field("pid", &self.pid)
            .field("version", &self.next_version())
            .finish_non_exhaustive()
    }
}

/// A section as handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSection {
    pub pid: u16,
    pub service_id: u16,
    pub bytes: Vec<u8>,
}

/// Sink that logs each section and keeps the latest one.
#[derive(Debug, Default)]
pub struct RecordingAitSink {
    latest: Mutex<Option<ReceivedSection>>,
    count: Mutex<usize>,
}

impl RecordingAitSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<ReceivedSection> {
        self.latest.lock().clone()
    }

    /// Number of sections received so far.
    pub fn count(&self) -> usize {
        *self.count.lock()
    }
}

impl AitSink for RecordingAitSink {
    fn process_ait_section(&self, pid: u16, service_id: u16, section: &[u8]) {
        info!(pid, service_id, len = section.len(), "AIT section received");
        *self.count.lock() += 1;
        *self.latest.lock() = Some(ReceivedSection {
            pid,
            service_id,
            bytes: section.to_vec(),
        });
    }
}
