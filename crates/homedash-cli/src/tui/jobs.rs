use super::*;

/// Result of a request that ran on the runtime, delivered back to the event loop.
pub(in crate::tui) enum JobResult {
    Submitted(IntegrationKind, RequestOutcome),
    Disconnected(IntegrationKind, RequestOutcome),
}

impl TuiApp {
    pub(in crate::tui) fn start_submit(&mut self, kind: IntegrationKind) {
        let Some(controller) = self.board.get_mut(kind) else {
            return;
        };
        let request = match controller.begin_submit() {
            Ok(request) => request,
            // Already shown inside the form.
            Err(err) if err.is_user_facing() => return,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };
        let gateway = Arc::clone(&self.gateway);
        let tx = self.job_tx.clone();
        self.runtime.spawn(async move {
            let outcome = request.send(gateway.as_ref()).await;
            let _ = tx.send(JobResult::Submitted(request.kind, outcome));
        });
    }

    pub(in crate::tui) fn start_disconnect(&mut self, kind: IntegrationKind) {
        let Some(controller) = self.board.get_mut(kind) else {
            return;
        };
        // The confirm modal has already asked.
        let request = match controller.begin_disconnect(&mut |_: &str| true) {
            Ok(Some(request)) => request,
            Ok(None) => return,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };
        let gateway = Arc::clone(&self.gateway);
        let tx = self.job_tx.clone();
        self.runtime.spawn(async move {
            let outcome = request.send(gateway.as_ref()).await;
            let _ = tx.send(JobResult::Disconnected(request.kind, outcome));
        });
    }

    pub(in crate::tui) fn poll_jobs(&mut self) {
        while let Ok(result) = self.job_rx.try_recv() {
            match result {
                JobResult::Submitted(kind, outcome) => self.apply_submit(kind, outcome),
                JobResult::Disconnected(kind, outcome) => self.apply_disconnect(kind, outcome),
            }
        }
    }

    fn apply_submit(&mut self, kind: IntegrationKind, outcome: RequestOutcome) {
        let Some(controller) = self.board.get_mut(kind) else {
            return;
        };
        let mode = match controller.phase() {
            Phase::Submitting(mode) => mode,
            _ => return,
        };
        match controller.finish_submit(outcome) {
            Ok(()) => {
                if self.view == View::Form(kind) {
                    self.view = View::Board;
                }
                self.status = Some(match mode {
                    FormMode::Connect => format!("Connected to {kind}."),
                    FormMode::Edit => format!("Updated {kind}."),
                });
                self.save_connected();
            }
            // The form stays open with the error shown inside it.
            Err(err) => debug!(service = %kind, error = %err, "Submit failed"),
        }
    }

    fn apply_disconnect(&mut self, kind: IntegrationKind, outcome: RequestOutcome) {
        let Some(controller) = self.board.get_mut(kind) else {
            return;
        };
        match controller.finish_disconnect(outcome) {
            Ok(()) => {
                self.status = Some(format!("Disconnected from {kind}."));
                self.save_connected();
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn save_connected(&mut self) {
        let connected = self.board.connected_kinds();
        if let Err(err) = self.session.persist_connected(connected) {
            warn!(error = %format!("{err:#}"), "Failed to save connection status");
        }
    }
}
