//! One run's workspace, modeled as an explicit state machine:
//! collecting-input → awaiting-mapping-confirmation → ready-to-extract →
//! done. Each session owns its record set and mapping; nothing is shared
//! across runs, so concurrent runs simply use separate sessions.

use log::{debug, warn};

use crate::{
    data::RecordSet,
    error::IntakeError,
    extract::{self, ProcessingOutcome},
    loader::{self, SourceFile},
    mapping::ColumnMapping,
    matcher::{self, MatchTier},
    registry::{self, Mode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    CollectingInput,
    AwaitingMappingConfirmation,
    ReadyToExtract,
    Done,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::CollectingInput => "collecting-input",
            SessionState::AwaitingMappingConfirmation => "awaiting-mapping-confirmation",
            SessionState::ReadyToExtract => "ready-to-extract",
            SessionState::Done => "done",
        }
    }
}

#[derive(Debug)]
pub struct Session {
    mode: Mode,
    state: SessionState,
    records: Option<RecordSet>,
    confirmed: Option<ColumnMapping>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            state: SessionState::CollectingInput,
            records: None,
            confirmed: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), IntakeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(IntakeError::InvalidTransition {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    /// Loads the uploaded files into this session's unified record set.
    pub fn ingest(&mut self, files: &[SourceFile]) -> Result<&RecordSet, IntakeError> {
        self.expect_state(SessionState::CollectingInput)?;
        let records = loader::load(files)?;
        debug!(
            "Ingested {} file(s): {} row(s), {} column(s)",
            files.len(),
            records.row_count(),
            records.columns().len()
        );
        self.state = SessionState::AwaitingMappingConfirmation;
        Ok(self.records.insert(records))
    }

    /// Matcher proposals for every logical column of the mode, in sorted
    /// logical-column order.
    pub fn propose(&self) -> Result<Vec<(String, Option<(String, MatchTier)>)>, IntakeError> {
        self.expect_state(SessionState::AwaitingMappingConfirmation)?;
        let records = self.records.as_ref().ok_or(IntakeError::InvalidTransition {
            expected: SessionState::AwaitingMappingConfirmation.name(),
            actual: SessionState::CollectingInput.name(),
        })?;
        Ok(matcher::suggest_all(self.mode, records.columns()))
    }

    /// Builds a mapping from the proposals. Each raw label is claimed by the
    /// first logical column that suggests it; later duplicates stay unmapped
    /// for the user to resolve by hand.
    pub fn proposed_mapping(&self) -> Result<ColumnMapping, IntakeError> {
        let proposals = self.propose()?;
        let mut mapping = ColumnMapping::new();
        for (logical, proposal) in proposals {
            if let Some((raw, _)) = proposal {
                if mapping.get(&raw).is_some() {
                    warn!(
                        "label '{raw}' already claimed; leaving '{logical}' unmapped"
                    );
                    continue;
                }
                mapping.insert(&raw, &logical)?;
            }
        }
        Ok(mapping)
    }

    /// Accepts a user-confirmed (or loaded) mapping after checking that the
    /// mode's mandatory fields all resolve.
    pub fn confirm(&mut self, mapping: ColumnMapping) -> Result<(), IntakeError> {
        self.expect_state(SessionState::AwaitingMappingConfirmation)?;
        mapping.validate(registry::mandatory_fields(self.mode))?;
        self.confirmed = Some(mapping);
        self.state = SessionState::ReadyToExtract;
        Ok(())
    }

    /// Runs the extraction engine. Consumes the confirmed mapping; the
    /// session is done afterwards regardless of per-table outcomes.
    pub fn extract(&mut self) -> Result<ProcessingOutcome, IntakeError> {
        self.expect_state(SessionState::ReadyToExtract)?;
        let (records, mapping) = match (self.records.take(), self.confirmed.take()) {
            (Some(records), Some(mapping)) => (records, mapping),
            _ => {
                return Err(IntakeError::InvalidTransition {
                    expected: SessionState::ReadyToExtract.name(),
                    actual: self.state.name(),
                });
            }
        };
        let contract = registry::contract_for(self.mode);
        let outcome = extract::process(&records, &mapping, contract);
        self.state = SessionState::Done;
        Ok(outcome)
    }
}
