//! FIR report composer
//!
//! Holds the First Information Report form record, validates it on
//! submission and produces a read-only preview snapshot. PDF generation is
//! not implemented; [`ReportPreview::render_text`] renders the preview as
//! plain text instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::{CoreError, Result};

/// Incident types offered by the form. Suggestions only; any non-empty
/// value is accepted.
pub const INCIDENT_TYPES: [&str; 8] = [
    "Theft",
    "Assault",
    "Fraud",
    "Cybercrime",
    "Property Damage",
    "Missing Person",
    "Traffic Accident",
    "Other",
];

/// One field of the report form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    FullName,
    Location,
    IncidentType,
    DateOfIncident,
    TimeOfIncident,
    Description,
}

impl ReportField {
    /// Every field, in form order
    pub const ALL: [ReportField; 6] = [
        ReportField::FullName,
        ReportField::Location,
        ReportField::IncidentType,
        ReportField::DateOfIncident,
        ReportField::TimeOfIncident,
        ReportField::Description,
    ];

    /// Wire name (camelCase)
    pub fn name(self) -> &'static str {
        match self {
            ReportField::FullName => "fullName",
            ReportField::Location => "location",
            ReportField::IncidentType => "incidentType",
            ReportField::DateOfIncident => "dateOfIncident",
            ReportField::TimeOfIncident => "timeOfIncident",
            ReportField::Description => "description",
        }
    }

    /// Label used in the rendered preview
    pub fn label(self) -> &'static str {
        match self {
            ReportField::FullName => "Name",
            ReportField::Location => "Location",
            ReportField::IncidentType => "Incident Type",
            ReportField::DateOfIncident => "Date",
            ReportField::TimeOfIncident => "Time",
            ReportField::Description => "Description",
        }
    }
}

impl std::fmt::Display for ReportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportField {
    type Err = CoreError;

    /// Accepts the camelCase wire name or its snake_case spelling
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
        ReportField::ALL
            .into_iter()
            .find(|field| field.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// The report form record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRecord {
    pub full_name: String,
    pub location: String,
    pub incident_type: String,
    pub date_of_incident: String,
    pub time_of_incident: String,
    pub description: String,
}

impl ReportRecord {
    /// Read one field
    pub fn get(&self, field: ReportField) -> &str {
        match field {
            ReportField::FullName => &self.full_name,
            ReportField::Location => &self.location,
            ReportField::IncidentType => &self.incident_type,
            ReportField::DateOfIncident => &self.date_of_incident,
            ReportField::TimeOfIncident => &self.time_of_incident,
            ReportField::Description => &self.description,
        }
    }

    fn slot_mut(&mut self, field: ReportField) -> &mut String {
        match field {
            ReportField::FullName => &mut self.full_name,
            ReportField::Location => &mut self.location,
            ReportField::IncidentType => &mut self.incident_type,
            ReportField::DateOfIncident => &mut self.date_of_incident,
            ReportField::TimeOfIncident => &mut self.time_of_incident,
            ReportField::Description => &mut self.description,
        }
    }

    /// True when no field is blank
    pub fn is_complete(&self) -> bool {
        ReportField::ALL
            .iter()
            .all(|field| !self.get(*field).trim().is_empty())
    }
}

/// Read-only snapshot produced by a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPreview {
    record: ReportRecord,
    generated_at: DateTime<Utc>,
}

impl ReportPreview {
    pub fn record(&self) -> &ReportRecord {
        &self.record
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Render the preview as a plain-text document
    pub fn render_text(&self) -> String {
        let mut out = String::from("FIRST INFORMATION REPORT\n\n");

        for field in &ReportField::ALL[..5] {
            let _ = writeln!(out, "{}: {}", field.label(), self.record.get(*field));
        }
        let _ = write!(
            out,
            "\n{}:\n{}\n\nGenerated on {}\n",
            ReportField::Description.label(),
            self.record.description,
            self.generated_at.format("%Y-%m-%d")
        );

        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormState {
    Editing,
    PreviewReady(ReportPreview),
}

/// FIR form state machine: editing until a complete submission
#[derive(Debug, Clone)]
pub struct ReportForm {
    record: ReportRecord,
    state: FormState,
}

impl ReportForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self {
            record: ReportRecord::default(),
            state: FormState::Editing,
        }
    }

    /// Create a form pre-filled with `record`
    pub fn with_record(record: ReportRecord) -> Self {
        Self {
            record,
            state: FormState::Editing,
        }
    }

    pub fn record(&self) -> &ReportRecord {
        &self.record
    }

    /// Replace exactly one field. Any previous preview is discarded.
    pub fn set_field(&mut self, field: ReportField, value: impl Into<String>) {
        *self.record.slot_mut(field) = value.into();
        self.state = FormState::Editing;
    }

    /// Replace every field at once
    pub fn apply(&mut self, record: ReportRecord) {
        self.record = record;
        self.state = FormState::Editing;
    }

    /// Validate and move to the preview-ready state.
    ///
    /// Fails with [`CoreError::IncompleteReport`] if any field is blank;
    /// the form stays in the editing state.
    pub fn submit(&mut self) -> Result<ReportPreview> {
        if !self.record.is_complete() {
            self.state = FormState::Editing;
            return Err(CoreError::IncompleteReport);
        }

        let preview = ReportPreview {
            record: self.record.clone(),
            generated_at: Utc::now(),
        };
        tracing::debug!("FIR preview generated for {}", preview.record.incident_type);
        self.state = FormState::PreviewReady(preview.clone());

        Ok(preview)
    }

    /// The preview, once a submission succeeded
    pub fn preview(&self) -> Option<&ReportPreview> {
        match &self.state {
            FormState::PreviewReady(preview) => Some(preview),
            FormState::Editing => None,
        }
    }

    pub fn is_preview_ready(&self) -> bool {
        self.preview().is_some()
    }
}

impl Default for ReportForm {
    fn default() -> Self {
        Self::new()
    }
}
