// crates/pdp-authz-plugin/src/audit.rs
// ============================================================================
// Module: Decision Audit Logging
// Description: Decision record assembly and line-oriented log sinks.
// Purpose: Emit one auditable record per evaluation without failing requests.
// Dependencies: pdp-authz-core, serde_json
// ============================================================================

//! ## Overview
//! [`AuditRecorder`] assembles a [`DecisionRecord`] for every evaluation and
//! writes it to a [`DecisionLog`]. The two outcomes log differently:
//! - error path: a single line with the result, the error, and the raw input;
//! - success path: a status line followed by the full record as JSON.
//!
//! Emission returns a [`Result`] so the caller can report and discard
//! failures explicitly; nothing here ever aborts an evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use pdp_authz_core::AuditError;
use pdp_authz_core::DecisionInput;
use pdp_authz_core::DecisionLog;
use pdp_authz_core::DecisionRecord;
use pdp_authz_core::Labels;

// ============================================================================
// SECTION: Recorder
// ============================================================================

/// Builds and emits decision records for a single process.
#[derive(Clone)]
pub struct AuditRecorder {
    /// Static labels, including the instance identifier.
    labels: Labels,
    /// Destination for status lines and records.
    log: Arc<dyn DecisionLog>,
}

impl AuditRecorder {
    /// Creates a recorder bound to the process labels and a log sink.
    #[must_use]
    pub fn new(labels: Labels, log: Arc<dyn DecisionLog>) -> Self {
        Self {
            labels,
            log,
        }
    }

    /// Returns the labels stamped on every record.
    #[must_use]
    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Assembles the record for one evaluation.
    #[must_use]
    pub fn record(
        &self,
        input: Option<&DecisionInput>,
        config_bytes: &[u8],
        result: bool,
        error: Option<&dyn std::error::Error>,
    ) -> DecisionRecord {
        DecisionRecord::assemble(
            &self.labels,
            input,
            config_bytes,
            result,
            error.map(ToString::to_string),
        )
    }

    /// Writes the record to the decision log.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when serialization or the sink write fails.
    pub fn emit(&self, record: &DecisionRecord) -> Result<(), AuditError> {
        if let Some(error) = &record.error {
            let input = serde_json::to_string(&record.input)
                .map_err(|err| AuditError::Serialization(err.to_string()))?;
            return self.log.write_line(&format!(
                "Returning PDP decision: {} (error: {error}; input: {input})",
                record.result
            ));
        }
        self.log.write_line(&format!("Returning PDP decision: {}", record.result))?;
        let payload = serde_json::to_string(record)
            .map_err(|err| AuditError::Serialization(err.to_string()))?;
        self.log.write_line(&payload)
    }

    /// Writes a free-form status line to the decision log.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Write`] when the sink write fails.
    pub fn note(&self, line: &str) -> Result<(), AuditError> {
        self.log.write_line(line)
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Decision log writing lines to any writer.
pub struct WriterDecisionLog<W: Write + Send> {
    /// Output writer for log lines.
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterDecisionLog<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> DecisionLog for WriterDecisionLog<W> {
    fn write_line(&self, line: &str) -> Result<(), AuditError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| AuditError::Write("decision log mutex poisoned".to_string()))?;
        writeln!(guard, "{line}").map_err(|err| AuditError::Write(err.to_string()))?;
        guard.flush().map_err(|err| AuditError::Write(err.to_string()))
    }
}

/// Decision log appending to a file.
pub type FileDecisionLog = WriterDecisionLog<File>;

impl WriterDecisionLog<File> {
    /// Opens the log file in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open_append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

/// Decision log writing lines to stderr.
pub struct StderrDecisionLog;

impl DecisionLog for StderrDecisionLog {
    fn write_line(&self, line: &str) -> Result<(), AuditError> {
        writeln!(io::stderr().lock(), "{line}").map_err(|err| AuditError::Write(err.to_string()))
    }
}
