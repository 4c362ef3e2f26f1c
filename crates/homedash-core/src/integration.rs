use crate::error::{IntegrationError, Phase};
use crate::gateway::{ConnectionGateway, FieldMap, RequestOutcome};
use crate::model::{Action, FormMode, IntegrationKind};
use crate::overlay::OverlayCoordinator;
use crate::registry::IntegrationDefinition;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// User-visible state of one integration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrationState {
    pub connected: bool,
    /// Only ever holds keys from the definition's required fields.
    pub form_values: BTreeMap<&'static str, String>,
    pub error_message: String,
    pub form_open: bool,
}

/// A validated connect/edit request, ready to hand to a gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub kind: IntegrationKind,
    pub mode: FormMode,
    pub fields: FieldMap,
}

impl SubmitRequest {
    pub async fn send(&self, gateway: &dyn ConnectionGateway) -> RequestOutcome {
        let result = match self.mode {
            FormMode::Connect => gateway.connect(self.kind, &self.fields).await,
            FormMode::Edit => gateway.edit(self.kind, &self.fields).await,
        };
        RequestOutcome::from_result(result)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisconnectRequest {
    pub kind: IntegrationKind,
}

impl DisconnectRequest {
    pub async fn send(&self, gateway: &dyn ConnectionGateway) -> RequestOutcome {
        RequestOutcome::from_result(gateway.disconnect(self.kind).await)
    }
}

/// Blocking yes/no question put to the user before a destructive action.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

pub fn disconnect_prompt(kind: IntegrationKind) -> String {
    format!("Are you sure you want to disconnect from {kind}?")
}

/// Drives one integration's credential form and connection requests.
///
/// Requests are split into `begin_*` (validate, mark in flight, build the
/// request) and `finish_*` (apply the outcome) so a view can run the network
/// call elsewhere and keep rendering the `Submitting` phase meanwhile.
/// `submit` and `disconnect` run both halves in one call.
pub struct IntegrationController {
    definition: &'static IntegrationDefinition,
    gateway: Arc<dyn ConnectionGateway>,
    overlay: OverlayCoordinator,
    state: IntegrationState,
    phase: Phase,
}

impl IntegrationController {
    pub fn new(
        definition: &'static IntegrationDefinition,
        connected: bool,
        gateway: Arc<dyn ConnectionGateway>,
        overlay: OverlayCoordinator,
    ) -> Self {
        Self {
            definition,
            gateway,
            overlay,
            state: IntegrationState {
                connected,
                ..IntegrationState::default()
            },
            phase: resting_phase(connected),
        }
    }

    pub fn kind(&self) -> IntegrationKind {
        self.definition.kind
    }

    pub fn definition(&self) -> &'static IntegrationDefinition {
        self.definition
    }

    pub fn state(&self) -> &IntegrationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    pub fn error_message(&self) -> &str {
        &self.state.error_message
    }

    pub fn form_value(&self, field: &str) -> &str {
        self.state
            .form_values
            .get(field)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn open_form(&mut self) -> Result<FormMode, IntegrationError> {
        let mode = match self.phase {
            Phase::Disconnected => FormMode::Connect,
            Phase::Connected => FormMode::Edit,
            phase => return Err(self.invalid("open the form for", phase)),
        };
        self.phase = Phase::FormOpen(mode);
        self.state.form_open = true;
        self.overlay.show();
        debug!(service = %self.kind(), mode = ?mode, "Form opened");
        Ok(mode)
    }

    pub fn update_field(&mut self, field: &str, value: &str) -> Result<(), IntegrationError> {
        if !matches!(self.phase, Phase::FormOpen(_)) {
            return Err(self.invalid("edit fields of", self.phase));
        }
        let Some(key) = self.definition.field(field) else {
            return Err(IntegrationError::UnknownField {
                service: self.kind(),
                field: field.to_string(),
            });
        };
        self.state.form_values.insert(key, value.to_string());
        self.state.error_message.clear();
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), IntegrationError> {
        if !matches!(self.phase, Phase::FormOpen(_)) {
            return Err(self.invalid("cancel the form for", self.phase));
        }
        self.phase = resting_phase(self.state.connected);
        self.state.form_open = false;
        self.overlay.hide();
        Ok(())
    }

    /// Validates the form and moves to `Submitting`.
    ///
    /// Only the first missing field (in registry order) is reported.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, IntegrationError> {
        let mode = match self.phase {
            Phase::FormOpen(mode) => mode,
            phase if phase.is_in_flight() => {
                return Err(IntegrationError::Busy {
                    service: self.kind(),
                });
            }
            phase => return Err(self.invalid("submit", phase)),
        };

        for &field in self.definition.required_fields {
            if self.form_value(field).is_empty() {
                let err = IntegrationError::Validation { field };
                debug!(service = %self.kind(), field, "Required field missing");
                self.state.error_message = err.to_string();
                self.overlay.hide();
                return Err(err);
            }
        }

        let fields: FieldMap = self
            .definition
            .required_fields
            .iter()
            .map(|field| (field.to_string(), self.form_value(field).to_string()))
            .collect();
        self.phase = Phase::Submitting(mode);
        self.overlay.show();
        info!(service = %self.kind(), action = Action::from(mode).label(), "Submitting credentials");
        Ok(SubmitRequest {
            kind: self.kind(),
            mode,
            fields,
        })
    }

    pub fn finish_submit(&mut self, outcome: RequestOutcome) -> Result<(), IntegrationError> {
        let Phase::Submitting(mode) = self.phase else {
            return Err(self.invalid("complete a submit for", self.phase));
        };
        self.overlay.hide();
        let action = Action::from(mode);
        match outcome {
            RequestOutcome::Success => {
                if mode == FormMode::Connect {
                    self.state.connected = true;
                }
                self.state.form_open = false;
                self.state.error_message.clear();
                if !self.definition.retain_fields_on_success {
                    self.state.form_values.clear();
                }
                self.phase = Phase::Connected;
                info!(service = %self.kind(), action = action.label(), "Integration updated");
                Ok(())
            }
            RequestOutcome::ServiceError { message, traceback } => {
                self.phase = Phase::FormOpen(mode);
                Err(self.service_failure(action, message, traceback))
            }
            RequestOutcome::TransportError(detail) => {
                self.phase = Phase::FormOpen(mode);
                Err(self.transport_failure(action, detail))
            }
        }
    }

    /// Runs a whole submit. Dropping the future before the reply lands returns
    /// the controller to the open form.
    pub async fn submit(&mut self) -> Result<(), IntegrationError> {
        let request = self.begin_submit()?;
        let gateway = Arc::clone(&self.gateway);
        let in_flight = InFlight::new(self);
        let outcome = request.send(gateway.as_ref()).await;
        in_flight.settle(|controller| controller.finish_submit(outcome))
    }

    /// Asks for confirmation and moves to `Disconnecting`.
    ///
    /// Returns `Ok(None)` when the user declines; nothing changes in that case.
    pub fn begin_disconnect(
        &mut self,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Result<Option<DisconnectRequest>, IntegrationError> {
        match self.phase {
            Phase::Connected => {}
            phase if phase.is_in_flight() => {
                return Err(IntegrationError::Busy {
                    service: self.kind(),
                });
            }
            phase => return Err(self.invalid("disconnect", phase)),
        }
        if !prompt.confirm(&disconnect_prompt(self.kind())) {
            debug!(service = %self.kind(), "Disconnect declined");
            return Ok(None);
        }
        self.phase = Phase::Disconnecting;
        self.overlay.show();
        info!(service = %self.kind(), "Disconnecting");
        Ok(Some(DisconnectRequest { kind: self.kind() }))
    }

    pub fn finish_disconnect(&mut self, outcome: RequestOutcome) -> Result<(), IntegrationError> {
        if self.phase != Phase::Disconnecting {
            return Err(self.invalid("complete a disconnect for", self.phase));
        }
        self.overlay.hide();
        match outcome {
            RequestOutcome::Success => {
                self.state.connected = false;
                self.state.form_values.clear();
                self.state.form_open = false;
                self.state.error_message.clear();
                self.phase = Phase::Disconnected;
                info!(service = %self.kind(), "Integration disconnected");
                Ok(())
            }
            RequestOutcome::ServiceError { message, traceback } => {
                self.phase = Phase::Connected;
                Err(self.service_failure(Action::Disconnect, message, traceback))
            }
            RequestOutcome::TransportError(detail) => {
                self.phase = Phase::Connected;
                Err(self.transport_failure(Action::Disconnect, detail))
            }
        }
    }

    /// Returns `Ok(false)` when the user declined the confirmation.
    pub async fn disconnect(
        &mut self,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Result<bool, IntegrationError> {
        let Some(request) = self.begin_disconnect(prompt)? else {
            return Ok(false);
        };
        let gateway = Arc::clone(&self.gateway);
        let in_flight = InFlight::new(self);
        let outcome = request.send(gateway.as_ref()).await;
        in_flight.settle(|controller| controller.finish_disconnect(outcome).map(|()| true))
    }

    /// Drops an in-flight request whose outcome will never arrive.
    pub fn abort_request(&mut self) {
        self.phase = match self.phase {
            Phase::Submitting(mode) => Phase::FormOpen(mode),
            Phase::Disconnecting => Phase::Connected,
            phase => phase,
        };
        self.overlay.hide();
    }

    /// The traceback goes to the operational log only.
    fn service_failure(
        &mut self,
        action: Action,
        message: String,
        traceback: Option<String>,
    ) -> IntegrationError {
        warn!(
            service = %self.kind(),
            action = action.label(),
            error = %message,
            traceback = traceback.as_deref().unwrap_or(""),
            "Service rejected request"
        );
        let err = IntegrationError::Service {
            action,
            service: self.kind(),
            message,
        };
        self.state.error_message = err.to_string();
        err
    }

    fn transport_failure(&mut self, action: Action, detail: String) -> IntegrationError {
        warn!(service = %self.kind(), action = action.label(), error = %detail, "Request failed");
        let err = IntegrationError::Transport {
            action,
            service: self.kind(),
            detail,
        };
        self.state.error_message = err.to_string();
        err
    }

    fn invalid(&self, operation: &'static str, phase: Phase) -> IntegrationError {
        IntegrationError::InvalidState {
            operation,
            service: self.kind(),
            phase,
        }
    }
}

fn resting_phase(connected: bool) -> Phase {
    if connected {
        Phase::Connected
    } else {
        Phase::Disconnected
    }
}

/// Restores a resting phase if dropped before the request's outcome is applied.
struct InFlight<'a> {
    controller: &'a mut IntegrationController,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(controller: &'a mut IntegrationController) -> Self {
        Self {
            controller,
            settled: false,
        }
    }

    fn settle<T>(mut self, apply: impl FnOnce(&mut IntegrationController) -> T) -> T {
        self.settled = true;
        apply(&mut *self.controller)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!(
                service = %self.controller.kind(),
                phase = %self.controller.phase(),
                "Request dropped before completion"
            );
            self.controller.abort_request();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayFuture;
    use crate::model::ServiceResponse;
    use crate::registry::definition;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Connect(IntegrationKind, FieldMap),
        Edit(IntegrationKind, FieldMap),
        Disconnect(IntegrationKind),
    }

    struct FakeGateway {
        reply: Mutex<Option<anyhow::Result<ServiceResponse>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeGateway {
        fn replying(reply: anyhow::Result<ServiceResponse>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: Call) -> anyhow::Result<ServiceResponse> {
            self.calls.lock().unwrap().push(call);
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(ServiceResponse::ok()))
        }
    }

    impl ConnectionGateway for FakeGateway {
        fn connect<'a>(
            &'a self,
            kind: IntegrationKind,
            fields: &'a FieldMap,
        ) -> GatewayFuture<'a, ServiceResponse> {
            let reply = self.answer(Call::Connect(kind, fields.clone()));
            Box::pin(async move { reply })
        }

        fn edit<'a>(
            &'a self,
            kind: IntegrationKind,
            fields: &'a FieldMap,
        ) -> GatewayFuture<'a, ServiceResponse> {
            let reply = self.answer(Call::Edit(kind, fields.clone()));
            Box::pin(async move { reply })
        }

        fn disconnect<'a>(&'a self, kind: IntegrationKind) -> GatewayFuture<'a, ServiceResponse> {
            let reply = self.answer(Call::Disconnect(kind));
            Box::pin(async move { reply })
        }
    }

    fn controller(
        kind: IntegrationKind,
        connected: bool,
        gateway: Arc<FakeGateway>,
    ) -> (IntegrationController, OverlayCoordinator) {
        let overlay = OverlayCoordinator::new();
        let controller =
            IntegrationController::new(definition(kind), connected, gateway, overlay.clone());
        (controller, overlay)
    }

    fn fill_all(controller: &mut IntegrationController) {
        for field in controller.definition().required_fields {
            controller
                .update_field(field, &format!("{field}-value"))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn missing_second_field_reports_it_without_network() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::GoogleCalendar, false, gateway.clone());
        ctl.open_form().unwrap();
        assert!(overlay.is_visible());
        ctl.update_field("client_id", "abc").unwrap();

        let err = ctl.submit().await.unwrap_err();
        assert_eq!(
            err,
            IntegrationError::Validation {
                field: "client_secret"
            }
        );
        assert_eq!(ctl.error_message(), "Please enter a value for client_secret");
        assert_eq!(ctl.phase(), Phase::FormOpen(FormMode::Connect));
        assert!(!overlay.is_visible());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn validation_reports_first_missing_field_in_registry_order() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::Spotify, false, gateway.clone());
        ctl.open_form().unwrap();
        ctl.update_field("redirect_uri", "https://example.test/cb").unwrap();
        ctl.update_field("client_secret", "s").unwrap();
        ctl.update_field("client_id", "").unwrap();

        let err = ctl.submit().await.unwrap_err();
        assert_eq!(err, IntegrationError::Validation { field: "username" });
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_connect_closes_form_and_clears_values() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::GoogleCalendar, false, gateway.clone());
        ctl.open_form().unwrap();
        ctl.update_field("client_id", "abc").unwrap();
        ctl.update_field("client_secret", "xyz").unwrap();

        ctl.submit().await.unwrap();

        let expected: FieldMap = [
            ("client_id".to_string(), "abc".to_string()),
            ("client_secret".to_string(), "xyz".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            gateway.calls(),
            vec![Call::Connect(IntegrationKind::GoogleCalendar, expected)]
        );
        assert_eq!(ctl.phase(), Phase::Connected);
        assert!(ctl.is_connected());
        assert!(!ctl.state().form_open);
        assert!(ctl.state().form_values.is_empty());
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn every_complete_form_reaches_the_network_once() {
        for kind in IntegrationKind::ALL {
            let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
            let (mut ctl, overlay) = controller(kind, false, gateway.clone());
            ctl.open_form().unwrap();
            fill_all(&mut ctl);
            ctl.submit().await.unwrap();
            assert_eq!(gateway.calls().len(), 1, "{kind}");
            assert!(!overlay.is_visible());
        }
    }

    #[tokio::test]
    async fn hue_keeps_bridge_values_after_success() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::PhilipsHue, false, gateway);
        ctl.open_form().unwrap();
        ctl.update_field("bridge_ip", "192.168.1.20").unwrap();
        ctl.submit().await.unwrap();

        assert!(ctl.is_connected());
        assert_eq!(ctl.form_value("bridge_ip"), "192.168.1.20");
    }

    #[tokio::test]
    async fn service_failure_keeps_form_open_with_server_message() {
        let reply = ServiceResponse {
            success: false,
            error: Some("invalid credentials".to_string()),
            traceback: Some("Traceback: boom".to_string()),
        };
        let gateway = FakeGateway::replying(Ok(reply));
        let (mut ctl, overlay) = controller(IntegrationKind::GoogleCalendar, false, gateway);
        ctl.open_form().unwrap();
        fill_all(&mut ctl);

        let err = ctl.submit().await.unwrap_err();
        assert!(matches!(err, IntegrationError::Service { .. }));
        assert_eq!(
            ctl.error_message(),
            "Error connecting to GoogleCalendar: invalid credentials"
        );
        assert!(!ctl.error_message().contains("Traceback"));
        assert_eq!(ctl.phase(), Phase::FormOpen(FormMode::Connect));
        assert!(!ctl.is_connected());
        assert!(!overlay.is_visible());
        assert_eq!(ctl.form_value("client_id"), "client_id-value");
    }

    #[tokio::test]
    async fn transport_failure_on_edit_uses_editing_wording() {
        let gateway = FakeGateway::replying(Err(anyhow::anyhow!("connection refused")));
        let (mut ctl, overlay) = controller(IntegrationKind::Spotify, true, gateway.clone());
        assert_eq!(ctl.open_form().unwrap(), FormMode::Edit);
        fill_all(&mut ctl);

        ctl.submit().await.unwrap_err();
        assert_eq!(ctl.error_message(), "Error editing Spotify: connection refused");
        assert_eq!(ctl.phase(), Phase::FormOpen(FormMode::Edit));
        assert!(ctl.is_connected());
        assert!(!overlay.is_visible());
        assert!(matches!(gateway.calls()[0], Call::Edit(IntegrationKind::Spotify, _)));
    }

    #[tokio::test]
    async fn successful_edit_keeps_connection() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::GoogleCalendar, true, gateway);
        ctl.open_form().unwrap();
        fill_all(&mut ctl);
        ctl.submit().await.unwrap();
        assert!(ctl.is_connected());
        assert_eq!(ctl.phase(), Phase::Connected);
    }

    #[test]
    fn typing_clears_the_previous_error() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::GoogleCalendar, false, gateway);
        ctl.open_form().unwrap();
        ctl.begin_submit().unwrap_err();
        assert!(!ctl.error_message().is_empty());
        ctl.update_field("client_id", "a").unwrap();
        assert!(ctl.error_message().is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::PhilipsHue, false, gateway);
        ctl.open_form().unwrap();
        let err = ctl.update_field("client_id", "x").unwrap_err();
        assert!(matches!(err, IntegrationError::UnknownField { .. }));
        assert!(ctl.state().form_values.is_empty());
    }

    #[test]
    fn fields_cannot_change_while_form_is_closed() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::PhilipsHue, false, gateway);
        let err = ctl.update_field("bridge_ip", "x").unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidState { .. }));
    }

    #[test]
    fn cancel_restores_resting_phase_and_keeps_values() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::GoogleCalendar, false, gateway.clone());
        ctl.open_form().unwrap();
        ctl.update_field("client_id", "abc").unwrap();
        ctl.begin_submit().unwrap_err();
        ctl.cancel().unwrap();

        assert_eq!(ctl.phase(), Phase::Disconnected);
        assert!(!ctl.state().form_open);
        assert_eq!(ctl.form_value("client_id"), "abc");
        assert_eq!(ctl.error_message(), "Please enter a value for client_secret");
        assert!(!overlay.is_visible());
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::PhilipsHue, false, gateway);
        ctl.open_form().unwrap();
        ctl.update_field("bridge_ip", "10.0.0.2").unwrap();
        let request = ctl.begin_submit().unwrap();
        assert_eq!(request.mode, FormMode::Connect);
        assert_eq!(ctl.phase(), Phase::Submitting(FormMode::Connect));
        assert!(overlay.is_visible());

        let err = ctl.begin_submit().unwrap_err();
        assert_eq!(
            err,
            IntegrationError::Busy {
                service: IntegrationKind::PhilipsHue
            }
        );

        ctl.finish_submit(RequestOutcome::Success).unwrap();
        assert_eq!(ctl.phase(), Phase::Connected);
        assert!(!overlay.is_visible());
    }

    struct StalledGateway;

    impl ConnectionGateway for StalledGateway {
        fn connect<'a>(
            &'a self,
            _kind: IntegrationKind,
            _fields: &'a FieldMap,
        ) -> GatewayFuture<'a, ServiceResponse> {
            Box::pin(std::future::pending::<anyhow::Result<ServiceResponse>>())
        }

        fn disconnect<'a>(&'a self, _kind: IntegrationKind) -> GatewayFuture<'a, ServiceResponse> {
            Box::pin(std::future::pending::<anyhow::Result<ServiceResponse>>())
        }
    }

    fn stalled(
        kind: IntegrationKind,
        connected: bool,
    ) -> (IntegrationController, OverlayCoordinator) {
        let overlay = OverlayCoordinator::new();
        let controller = IntegrationController::new(
            definition(kind),
            connected,
            Arc::new(StalledGateway),
            overlay.clone(),
        );
        (controller, overlay)
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_submit_returns_to_form() {
        let (mut ctl, overlay) = stalled(IntegrationKind::PhilipsHue, false);
        ctl.open_form().unwrap();
        ctl.update_field("bridge_ip", "10.0.0.2").unwrap();

        let result =
            tokio::time::timeout(std::time::Duration::from_millis(10), ctl.submit()).await;
        assert!(result.is_err());
        assert_eq!(ctl.phase(), Phase::FormOpen(FormMode::Connect));
        assert!(!overlay.is_visible());
        assert_eq!(ctl.form_value("bridge_ip"), "10.0.0.2");

        assert!(ctl.begin_submit().is_ok());
        ctl.abort_request();
        ctl.cancel().unwrap();
        assert_eq!(ctl.phase(), Phase::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_disconnect_stays_connected() {
        let (mut ctl, overlay) = stalled(IntegrationKind::Spotify, true);
        let mut prompt = |_: &str| true;

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            ctl.disconnect(&mut prompt),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(ctl.phase(), Phase::Connected);
        assert!(ctl.is_connected());
        assert!(!overlay.is_visible());
        assert!(ctl.begin_disconnect(&mut prompt).unwrap().is_some());
    }

    #[test]
    fn abort_returns_to_form() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::PhilipsHue, false, gateway);
        ctl.open_form().unwrap();
        ctl.update_field("bridge_ip", "10.0.0.2").unwrap();
        ctl.begin_submit().unwrap();
        ctl.abort_request();
        assert_eq!(ctl.phase(), Phase::FormOpen(FormMode::Connect));
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn declined_disconnect_changes_nothing() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::Spotify, true, gateway.clone());
        let mut asked = Vec::new();
        let mut prompt = |message: &str| {
            asked.push(message.to_string());
            false
        };

        let done = ctl.disconnect(&mut prompt).await.unwrap();
        assert!(!done);
        assert_eq!(asked, vec!["Are you sure you want to disconnect from Spotify?"]);
        assert_eq!(ctl.phase(), Phase::Connected);
        assert!(gateway.calls().is_empty());
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn confirmed_disconnect_clears_state() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, overlay) = controller(IntegrationKind::PhilipsHue, true, gateway.clone());
        ctl.open_form().unwrap();
        ctl.update_field("bridge_ip", "10.0.0.2").unwrap();
        ctl.cancel().unwrap();

        let done = ctl.disconnect(&mut |_: &str| true).await.unwrap();
        assert!(done);
        assert_eq!(gateway.calls(), vec![Call::Disconnect(IntegrationKind::PhilipsHue)]);
        assert_eq!(ctl.phase(), Phase::Disconnected);
        assert!(!ctl.is_connected());
        assert!(ctl.state().form_values.is_empty());
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn failed_disconnect_stays_connected() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::failed("bridge unreachable")));
        let (mut ctl, overlay) = controller(IntegrationKind::PhilipsHue, true, gateway);

        let err = ctl.disconnect(&mut |_: &str| true).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Service { .. }));
        assert_eq!(
            ctl.error_message(),
            "Error disconnecting from PhilipsHue: bridge unreachable"
        );
        assert_eq!(ctl.phase(), Phase::Connected);
        assert!(ctl.is_connected());
        assert!(!overlay.is_visible());
    }

    #[tokio::test]
    async fn disconnect_requires_connection() {
        let gateway = FakeGateway::replying(Ok(ServiceResponse::ok()));
        let (mut ctl, _overlay) = controller(IntegrationKind::Spotify, false, gateway.clone());
        let err = ctl.disconnect(&mut |_: &str| true).await.unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidState { .. }));
        assert!(gateway.calls().is_empty());
    }
}
