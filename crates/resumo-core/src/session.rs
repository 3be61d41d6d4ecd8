//! In-memory report session.
//!
//! Holds the signed-in account, its report list and the active selection.
//! An extraction is started against a [`Selection`] ticket; its result is
//! only stored if that ticket is still the active selection when it
//! completes, so a slow response for a report the user navigated away from
//! is discarded instead of overwriting the view.

use tracing::{debug, info};

use crate::error::SessionError;
use crate::models::product::ExtractionResult;
use crate::models::report::{Report, ReportState};

/// Ticket returned by [`Session::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    id: String,
    generation: u64,
}

impl Selection {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Reports of one account plus the active selection.
#[derive(Debug, Default)]
pub struct Session {
    account: Option<String>,
    reports: Vec<Report>,
    active: Option<Selection>,
    in_flight: bool,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_account(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            ..Self::default()
        }
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn report(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Add a report at the top of the list.
    pub fn add_report(&mut self, report: Report) {
        debug!("Adding report {} ({})", report.id, report.name);
        self.reports.insert(0, report);
    }

    /// Replace the whole list, e.g. after a drive listing.
    ///
    /// Analyses already stored for ids that are still listed are kept.
    pub fn set_reports(&mut self, reports: Vec<Report>) {
        let previous = std::mem::take(&mut self.reports);
        self.reports = reports
            .into_iter()
            .map(|mut report| {
                if let Some(old) = previous.iter().find(|r| r.id == report.id && r.is_analyzed()) {
                    report.state = old.state.clone();
                }
                report
            })
            .collect();

        let active_gone = self
            .active
            .as_ref()
            .is_some_and(|active| self.report(&active.id).is_none());
        if active_gone {
            self.active = None;
            self.in_flight = false;
        }
    }

    /// Change account: every report and the selection are dropped.
    pub fn switch_account(&mut self, account: impl Into<String>) {
        let account = account.into();
        info!("Switching account to {}, clearing {} reports", account, self.reports.len());
        self.account = Some(account);
        self.reports.clear();
        self.active = None;
        self.in_flight = false;
        self.generation += 1;
    }

    /// Make `id` the active report and mark an extraction in flight.
    pub fn select(&mut self, id: &str) -> Result<Selection, SessionError> {
        if self.report(id).is_none() {
            return Err(SessionError::NotFound(id.to_string()));
        }

        self.generation += 1;
        let selection = Selection {
            id: id.to_string(),
            generation: self.generation,
        };
        self.active = Some(selection.clone());
        self.in_flight = true;
        Ok(selection)
    }

    /// Whether `selection` is still the active one.
    pub fn is_current(&self, selection: &Selection) -> bool {
        self.active.as_ref() == Some(selection)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn active_report(&self) -> Option<&Report> {
        self.active.as_ref().and_then(|s| self.report(&s.id))
    }

    /// Store the result of the extraction started with `selection`.
    ///
    /// Fails with [`SessionError::StaleSelection`] if another report was
    /// selected since; callers discard the result silently in that case.
    /// A report that is already analyzed keeps its first result.
    pub fn complete(&mut self, selection: &Selection, result: ExtractionResult) -> Result<&Report, SessionError> {
        if !self.is_current(selection) {
            debug!("Discarding result for stale selection {}", selection.id);
            return Err(SessionError::StaleSelection {
                id: selection.id.clone(),
            });
        }

        let report = self
            .reports
            .iter_mut()
            .find(|r| r.id == selection.id)
            .ok_or_else(|| SessionError::NotFound(selection.id.clone()))?;

        if report.is_analyzed() {
            debug!("Report {} already analyzed, keeping first result", report.id);
        } else {
            info!("Report {} analyzed: {} products", report.id, result.products.len());
            report.state = ReportState::Analyzed(result);
        }
        self.in_flight = false;

        Ok(report)
    }

    /// Record a failed extraction: the report stays as it was.
    pub fn fail(&mut self, selection: &Selection) {
        if self.is_current(selection) {
            self.in_flight = false;
        }
    }
}
