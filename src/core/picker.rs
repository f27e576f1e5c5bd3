//! Column picker state machine
//!
//! `ColumnPicker` owns all state of one picker instance and changes it only in
//! [`ColumnPicker::dispatch`]. Anything asynchronous (reading the file, sending
//! the request, saving the result) is returned as a [`PickerEffect`] for the
//! caller to run; its completion comes back as another [`PickerEvent`].
//!
//! Loads are ticketed. Selecting a file takes a new ticket and a completion
//! carrying any older ticket is dropped, so the last selected file wins even if
//! an earlier read finishes later. Reads are never cancelled.

use tracing::{debug, info, warn};

use crate::core::columns::{ColumnBoard, ColumnContainer, ColumnList};
use crate::core::file_parser::FileParser;
use crate::core::file_source::SharedFileSource;
use crate::core::models::{
    AppError, AppResult, ColumnSide, CsvDocument, IntakeKind, LoadTicket, PickerNotification,
    PickerPhase, PickerSnapshot, SubmitResponse, SubmitTicket,
};

/// Inputs to the state machine: user actions and I/O completions
#[derive(Debug)]
pub enum PickerEvent {
    /// Files dropped on the holder or picked in the browse dialog
    FilesOffered {
        kind: IntakeKind,
        sources: Vec<SharedFileSource>,
    },
    /// A read started by [`PickerEffect::ReadFile`] finished
    FileLoaded {
        ticket: LoadTicket,
        data: AppResult<Vec<u8>>,
    },
    ToggleColumn(String),
    DropOnItem {
        dragged: String,
        target: String,
    },
    DropOnChosen(String),
    HolderHover(bool),
    ChosenHover(bool),
    SetMatchAll(bool),
    Submit,
    /// A request started by [`PickerEffect::SendSubmission`] finished
    SubmitFinished {
        ticket: SubmitTicket,
        result: AppResult<SubmitResponse>,
    },
}

/// Work the caller must perform on behalf of the state machine
#[derive(Debug)]
pub enum PickerEffect {
    ReadFile {
        ticket: LoadTicket,
        source: SharedFileSource,
    },
    /// Re-read `source` and post it with the given columns
    SendSubmission {
        ticket: SubmitTicket,
        source: SharedFileSource,
        columns: Vec<String>,
        match_all: bool,
        /// Same limit the load was checked against; 0 disables it
        max_file_size: u64,
    },
    Present {
        ticket: SubmitTicket,
        document: CsvDocument,
    },
    Notify(PickerNotification),
}

#[derive(Debug)]
struct LoadedFile {
    source: SharedFileSource,
    delimiter: char,
}

/// One picker instance
pub struct ColumnPicker<C: ColumnContainer = ColumnList> {
    parser: FileParser,
    board: ColumnBoard<C>,
    loaded: Option<LoadedFile>,
    pending_load: Option<(LoadTicket, SharedFileSource)>,
    pending_submit: Option<SubmitTicket>,
    next_load: u64,
    next_submit: u64,
    match_all: bool,
    holder_hover: bool,
    chosen_hover: bool,
}

impl Default for ColumnPicker<ColumnList> {
    fn default() -> Self {
        Self::new(FileParser::new())
    }
}

impl ColumnPicker<ColumnList> {
    pub fn new(parser: FileParser) -> Self {
        Self::with_board(parser, ColumnBoard::default())
    }
}

impl<C: ColumnContainer> ColumnPicker<C> {
    pub fn with_board(parser: FileParser, mut board: ColumnBoard<C>) -> Self {
        board.clear();
        Self {
            parser,
            board,
            loaded: None,
            pending_load: None,
            pending_submit: None,
            next_load: 0,
            next_submit: 0,
            match_all: false,
            holder_hover: false,
            chosen_hover: false,
        }
    }

    pub fn phase(&self) -> PickerPhase {
        match (&self.loaded, self.pending_submit) {
            (None, _) => PickerPhase::Idle,
            (Some(_), Some(_)) => PickerPhase::Submitting,
            (Some(_), None) => PickerPhase::Loaded,
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase() == PickerPhase::Loaded
    }

    pub fn board(&self) -> &ColumnBoard<C> {
        &self.board
    }

    pub fn snapshot(&self) -> PickerSnapshot {
        PickerSnapshot {
            phase: self.phase(),
            file_name: self
                .loaded
                .as_ref()
                .map(|loaded| loaded.source.name().to_string()),
            delimiter: self.loaded.as_ref().map(|loaded| loaded.delimiter),
            available: self.board.available().to_vec(),
            chosen: self.board.chosen().to_vec(),
            match_all: self.match_all,
            submit_enabled: self.submit_enabled(),
            holder_hover: self.holder_hover,
            chosen_hover: self.chosen_hover,
        }
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: PickerEvent) -> AppResult<Option<PickerEffect>> {
        match event {
            PickerEvent::FilesOffered { kind, sources } => Ok(self.offer_files(kind, sources)),
            PickerEvent::FileLoaded { ticket, data } => Ok(self.finish_load(ticket, data)),
            PickerEvent::ToggleColumn(name) => {
                let side = self.board.toggle(&name)?;
                debug!("Column {:?} moved to {:?}", name, side);
                Ok(None)
            }
            PickerEvent::DropOnItem { dragged, target } => {
                self.chosen_hover = false;
                let side = self.board.drop_on_item(&dragged, &target)?;
                debug!("Column {:?} dropped before {:?} in {:?}", dragged, target, side);
                Ok(None)
            }
            PickerEvent::DropOnChosen(name) => {
                self.chosen_hover = false;
                self.board.drop_on_chosen(&name)?;
                debug!("Column {:?} appended to {:?}", name, ColumnSide::Chosen);
                Ok(None)
            }
            PickerEvent::HolderHover(hover) => {
                self.holder_hover = hover;
                Ok(None)
            }
            PickerEvent::ChosenHover(hover) => {
                self.chosen_hover = hover;
                Ok(None)
            }
            PickerEvent::SetMatchAll(match_all) => {
                self.match_all = match_all;
                Ok(None)
            }
            PickerEvent::Submit => self.start_submit().map(Some),
            PickerEvent::SubmitFinished { ticket, result } => {
                Ok(self.finish_submit(ticket, result))
            }
        }
    }

    fn offer_files(
        &mut self,
        kind: IntakeKind,
        sources: Vec<SharedFileSource>,
    ) -> Option<PickerEffect> {
        self.holder_hover = false;
        let offered = sources.len();
        let source = sources.into_iter().next()?;
        if offered > 1 {
            warn!("{} files offered, using only {}", offered, source.name());
        }

        self.next_load += 1;
        let ticket = LoadTicket(self.next_load);
        info!("📁 Loading {} via {:?} ({:?})", source.name(), kind, ticket);
        self.pending_load = Some((ticket, source.clone()));
        Some(PickerEffect::ReadFile { ticket, source })
    }

    fn finish_load(
        &mut self,
        ticket: LoadTicket,
        data: AppResult<Vec<u8>>,
    ) -> Option<PickerEffect> {
        let source = match self.pending_load.take() {
            Some((pending, source)) if pending == ticket => source,
            other => {
                debug!("Discarding superseded load {:?}", ticket);
                self.pending_load = other;
                return None;
            }
        };

        let sniffed = data.and_then(|bytes| self.parser.sniff(&bytes));
        match sniffed {
            Ok(Some(sniffed)) => {
                info!(
                    "✅ {} loaded: {} columns split on {:?}",
                    source.name(),
                    sniffed.headers.len(),
                    sniffed.delimiter
                );
                self.board.populate(sniffed.headers.iter().cloned());
                self.loaded = Some(LoadedFile {
                    source,
                    delimiter: sniffed.delimiter,
                });
                Some(PickerEffect::Notify(PickerNotification::Loaded {
                    ticket,
                    headers: sniffed.headers,
                    delimiter: sniffed.delimiter,
                }))
            }
            Ok(None) => {
                info!("No delimiter found in the header of {}", source.name());
                self.reset_to_idle();
                Some(PickerEffect::Notify(PickerNotification::LoadAborted {
                    ticket,
                    reason: "no delimiter found in the header line".to_string(),
                }))
            }
            Err(e) => {
                warn!("Failed to read {}: {}", source.name(), e);
                self.reset_to_idle();
                Some(PickerEffect::Notify(PickerNotification::LoadAborted {
                    ticket,
                    reason: e.to_string(),
                }))
            }
        }
    }

    fn reset_to_idle(&mut self) {
        self.board.clear();
        self.loaded = None;
    }

    fn start_submit(&mut self) -> AppResult<PickerEffect> {
        if !self.submit_enabled() {
            return Err(AppError::InvalidState(format!(
                "cannot submit while {:?}",
                self.phase()
            )));
        }
        let source = match &self.loaded {
            Some(loaded) => loaded.source.clone(),
            None => return Err(AppError::InvalidState("no file loaded".to_string())),
        };

        self.next_submit += 1;
        let ticket = SubmitTicket(self.next_submit);
        self.pending_submit = Some(ticket);

        let columns = self.board.chosen().to_vec();
        info!(
            "🚀 Submitting {} with columns {:?} (match_all={})",
            source.name(),
            columns,
            self.match_all
        );
        Ok(PickerEffect::SendSubmission {
            ticket,
            source,
            columns,
            match_all: self.match_all,
            max_file_size: self.parser.config().max_file_size,
        })
    }

    fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: AppResult<SubmitResponse>,
    ) -> Option<PickerEffect> {
        if self.pending_submit != Some(ticket) {
            warn!("Ignoring completion of unknown submission {:?}", ticket);
            return None;
        }
        self.pending_submit = None;

        match result {
            Ok(response) if response.status == 200 => Some(PickerEffect::Present {
                ticket,
                document: CsvDocument::from_body(response.body),
            }),
            Ok(response) => {
                warn!("❌ Submission {:?} rejected with HTTP {}", ticket, response.status);
                Some(PickerEffect::Notify(PickerNotification::SubmitFailed {
                    ticket,
                    message: format!("Server responded with HTTP {}", response.status),
                }))
            }
            Err(e) => {
                warn!("❌ Submission {:?} failed: {}", ticket, e);
                Some(PickerEffect::Notify(PickerNotification::SubmitFailed {
                    ticket,
                    message: e.to_string(),
                }))
            }
        }
    }
}
