//! Picker runtime command router.
//!
//! A thin async command queue that owns one [`ColumnPicker`], feeds it events
//! one at a time and runs the effects it asks for. File reads and HTTP requests
//! run as spawned tasks that post their completions back into the same queue,
//! so picker state is only ever touched by the router loop.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::core::document::DocumentPresenter;
use crate::core::file_source::SharedFileSource;
use crate::core::models::{
    AppError, AppResult, IntakeKind, PickerNotification, PickerSnapshot, SubmissionPayload,
    SubmitTicket,
};
use crate::core::picker::{ColumnPicker, PickerEffect, PickerEvent};
use crate::core::submitter::HttpSubmitter;

/// Commands understood by the runtime router.
#[derive(Debug)]
pub enum RuntimeCommand {
    Dispatch {
        event: PickerEvent,
        respond_to: Option<oneshot::Sender<AppResult<()>>>,
    },
    Snapshot {
        respond_to: oneshot::Sender<PickerSnapshot>,
    },
}

/// Collaborators the router hands work to
#[derive(Clone)]
pub struct PickerServices {
    pub submitter: Arc<dyn HttpSubmitter>,
    pub presenter: Arc<dyn DocumentPresenter>,
    pub endpoint: Url,
}

/// Handle exposed to front ends.
#[derive(Clone)]
pub struct PickerRuntimeHandle {
    sender: mpsc::Sender<RuntimeCommand>,
    notifications: broadcast::Sender<PickerNotification>,
}

impl PickerRuntimeHandle {
    /// Receive notifications emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PickerNotification> {
        self.notifications.subscribe()
    }

    async fn send_event(&self, event: PickerEvent) -> AppResult<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RuntimeCommand::Dispatch {
                event,
                respond_to: Some(tx),
            })
            .await
            .map_err(|e| AppError::System(format!("Picker runtime unavailable: {}", e)))?;
        rx.await
            .map_err(|_| AppError::System("Picker runtime dropped response".into()))?
    }

    pub async fn offer_files(
        &self,
        kind: IntakeKind,
        sources: Vec<SharedFileSource>,
    ) -> AppResult<()> {
        self.send_event(PickerEvent::FilesOffered { kind, sources })
            .await
    }

    /// Files dropped on the holder; only the first is used
    pub async fn drop_files(&self, sources: Vec<SharedFileSource>) -> AppResult<()> {
        self.offer_files(IntakeKind::Drop, sources).await
    }

    /// File picked through the browse dialog
    pub async fn browse_file(&self, source: SharedFileSource) -> AppResult<()> {
        self.offer_files(IntakeKind::Browse, vec![source]).await
    }

    pub async fn toggle_column(&self, name: impl Into<String>) -> AppResult<()> {
        self.send_event(PickerEvent::ToggleColumn(name.into()))
            .await
    }

    pub async fn drop_on_item(
        &self,
        dragged: impl Into<String>,
        target: impl Into<String>,
    ) -> AppResult<()> {
        self.send_event(PickerEvent::DropOnItem {
            dragged: dragged.into(),
            target: target.into(),
        })
        .await
    }

    pub async fn drop_on_chosen(&self, dragged: impl Into<String>) -> AppResult<()> {
        self.send_event(PickerEvent::DropOnChosen(dragged.into()))
            .await
    }

    pub async fn set_holder_hover(&self, hover: bool) -> AppResult<()> {
        self.send_event(PickerEvent::HolderHover(hover)).await
    }

    pub async fn set_chosen_hover(&self, hover: bool) -> AppResult<()> {
        self.send_event(PickerEvent::ChosenHover(hover)).await
    }

    pub async fn set_match_all(&self, match_all: bool) -> AppResult<()> {
        self.send_event(PickerEvent::SetMatchAll(match_all)).await
    }

    /// Start a submission; its outcome arrives as a notification
    pub async fn submit(&self) -> AppResult<()> {
        self.send_event(PickerEvent::Submit).await
    }

    pub async fn snapshot(&self) -> AppResult<PickerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RuntimeCommand::Snapshot { respond_to: tx })
            .await
            .map_err(|e| AppError::System(format!("Picker runtime unavailable: {}", e)))?;
        rx.await
            .map_err(|_| AppError::System("Picker runtime dropped response".into()))
    }
}

/// Spawn the router loop on the current tokio runtime.
pub fn spawn_picker_runtime(
    picker: ColumnPicker,
    services: PickerServices,
) -> AppResult<PickerRuntimeHandle> {
    let handle = Handle::try_current()
        .map_err(|e| AppError::System(format!("No tokio runtime available: {}", e)))?;

    let (tx, rx) = mpsc::channel(256);
    let (notifications, _) = broadcast::channel(64);

    let router = Router {
        picker,
        services,
        queue: tx.downgrade(),
        notifications: notifications.clone(),
    };
    handle.spawn(router.run(rx));
    tracing::info!("[RUNTIME] Picker router spawned");

    Ok(PickerRuntimeHandle {
        sender: tx,
        notifications,
    })
}

struct Router {
    picker: ColumnPicker,
    services: PickerServices,
    queue: mpsc::WeakSender<RuntimeCommand>,
    notifications: broadcast::Sender<PickerNotification>,
}

impl Router {
    async fn run(mut self, mut rx: mpsc::Receiver<RuntimeCommand>) {
        while let Some(cmd) = rx.recv().await {
            self.handle_command(cmd);
        }
        debug!("Picker runtime channel closed, exiting router loop");
    }

    #[instrument(skip_all)]
    fn handle_command(&mut self, command: RuntimeCommand) {
        match command {
            RuntimeCommand::Dispatch { event, respond_to } => {
                let result = match self.picker.dispatch(event) {
                    Ok(effect) => {
                        if let Some(effect) = effect {
                            self.run_effect(effect);
                        }
                        Ok(())
                    }
                    Err(e) => {
                        debug!("[RUNTIME_CMD] Event rejected: {}", e);
                        Err(e)
                    }
                };
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(result);
                }
            }
            RuntimeCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.picker.snapshot());
            }
        }
    }

    fn run_effect(&self, effect: PickerEffect) {
        match effect {
            PickerEffect::ReadFile { ticket, source } => {
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let data = source.read_bytes().await;
                    post_back(&queue, PickerEvent::FileLoaded { ticket, data }).await;
                });
            }
            PickerEffect::SendSubmission {
                ticket,
                source,
                columns,
                match_all,
                max_file_size,
            } => {
                let queue = self.queue.clone();
                let submitter = self.services.submitter.clone();
                let endpoint = self.services.endpoint.clone();
                tokio::spawn(async move {
                    let result = send_submission(
                        submitter.as_ref(),
                        &endpoint,
                        source,
                        columns,
                        match_all,
                        max_file_size,
                    )
                    .await;
                    post_back(&queue, PickerEvent::SubmitFinished { ticket, result }).await;
                });
            }
            PickerEffect::Present { ticket, document } => {
                let presenter = self.services.presenter.clone();
                let notifications = self.notifications.clone();
                tokio::spawn(async move {
                    let notification = match presenter.present(&document).await {
                        Ok(location) => PickerNotification::SubmitSucceeded {
                            ticket,
                            document,
                            location,
                        },
                        Err(e) => present_failed(ticket, e),
                    };
                    let _ = notifications.send(notification);
                });
            }
            PickerEffect::Notify(notification) => {
                // no receivers is fine
                let _ = self.notifications.send(notification);
            }
        }
    }
}

async fn send_submission(
    submitter: &dyn HttpSubmitter,
    endpoint: &Url,
    source: SharedFileSource,
    columns: Vec<String>,
    match_all: bool,
    max_file_size: u64,
) -> AppResult<crate::core::models::SubmitResponse> {
    // the file may have changed since it was sniffed
    let data = source.read_bytes().await?;
    if max_file_size > 0 && data.len() as u64 > max_file_size {
        return Err(AppError::Submit(format!(
            "{} is now {} bytes, limit is {} bytes",
            source.name(),
            data.len(),
            max_file_size
        )));
    }
    let payload = SubmissionPayload {
        data,
        file_name: source.name().to_string(),
        columns,
        match_all,
    };
    submitter.submit(endpoint, payload).await
}

fn present_failed(ticket: SubmitTicket, error: AppError) -> PickerNotification {
    warn!("Failed to present result of {:?}: {}", ticket, error);
    PickerNotification::SubmitFailed {
        ticket,
        message: format!("Result received but could not be saved: {}", error),
    }
}

async fn post_back(queue: &mpsc::WeakSender<RuntimeCommand>, event: PickerEvent) {
    let Some(sender) = queue.upgrade() else {
        debug!("Picker runtime gone, dropping completion");
        return;
    };
    let command = RuntimeCommand::Dispatch {
        event,
        respond_to: None,
    };
    if sender.send(command).await.is_err() {
        debug!("Picker runtime gone, dropping completion");
    }
}
