use crate::gateway::ConnectionGateway;
use crate::integration::IntegrationController;
use crate::model::IntegrationKind;
use crate::overlay::OverlayCoordinator;
use crate::registry::IntegrationRegistry;
use std::collections::BTreeSet;
use std::sync::Arc;

/// One controller per registered integration, sharing a gateway and overlay.
pub struct IntegrationBoard {
    controllers: Vec<IntegrationController>,
    overlay: OverlayCoordinator,
}

impl IntegrationBoard {
    pub fn new(
        registry: &IntegrationRegistry,
        connected: &BTreeSet<IntegrationKind>,
        gateway: Arc<dyn ConnectionGateway>,
        overlay: OverlayCoordinator,
    ) -> Self {
        let controllers = registry
            .definitions()
            .map(|def| {
                IntegrationController::new(
                    def,
                    connected.contains(&def.kind),
                    Arc::clone(&gateway),
                    overlay.clone(),
                )
            })
            .collect();
        Self {
            controllers,
            overlay,
        }
    }

    pub fn overlay(&self) -> &OverlayCoordinator {
        &self.overlay
    }

    pub fn controllers(&self) -> &[IntegrationController] {
        &self.controllers
    }

    pub fn get(&self, kind: IntegrationKind) -> Option<&IntegrationController> {
        self.controllers.iter().find(|ctl| ctl.kind() == kind)
    }

    pub fn get_mut(&mut self, kind: IntegrationKind) -> Option<&mut IntegrationController> {
        self.controllers.iter_mut().find(|ctl| ctl.kind() == kind)
    }

    pub fn connected_kinds(&self) -> BTreeSet<IntegrationKind> {
        self.controllers
            .iter()
            .filter(|ctl| ctl.is_connected())
            .map(|ctl| ctl.kind())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FieldMap, GatewayFuture};
    use crate::model::ServiceResponse;

    struct AlwaysOk;

    impl ConnectionGateway for AlwaysOk {
        fn connect<'a>(
            &'a self,
            _kind: IntegrationKind,
            _fields: &'a FieldMap,
        ) -> GatewayFuture<'a, ServiceResponse> {
            Box::pin(async { Ok(ServiceResponse::ok()) })
        }

        fn disconnect<'a>(&'a self, _kind: IntegrationKind) -> GatewayFuture<'a, ServiceResponse> {
            Box::pin(async { Ok(ServiceResponse::ok()) })
        }
    }

    #[test]
    fn seeds_connection_status_per_service() {
        let connected: BTreeSet<_> = [IntegrationKind::PhilipsHue].into_iter().collect();
        let board = IntegrationBoard::new(
            &IntegrationRegistry::new(),
            &connected,
            Arc::new(AlwaysOk),
            OverlayCoordinator::new(),
        );
        assert_eq!(board.controllers().len(), 3);
        assert!(board.get(IntegrationKind::PhilipsHue).unwrap().is_connected());
        assert!(!board.get(IntegrationKind::Spotify).unwrap().is_connected());
        assert_eq!(board.connected_kinds(), connected);
    }

    #[tokio::test]
    async fn failures_stay_scoped_to_one_service() {
        let mut board = IntegrationBoard::new(
            &IntegrationRegistry::new(),
            &BTreeSet::new(),
            Arc::new(AlwaysOk),
            OverlayCoordinator::new(),
        );
        let calendar = board.get_mut(IntegrationKind::GoogleCalendar).unwrap();
        calendar.open_form().unwrap();
        calendar.submit().await.unwrap_err();

        let hue = board.get_mut(IntegrationKind::PhilipsHue).unwrap();
        hue.open_form().unwrap();
        hue.update_field("bridge_ip", "10.0.0.9").unwrap();
        hue.submit().await.unwrap();

        assert!(!board.get(IntegrationKind::GoogleCalendar).unwrap().error_message().is_empty());
        assert!(board.get(IntegrationKind::PhilipsHue).unwrap().error_message().is_empty());
        assert_eq!(
            board.connected_kinds(),
            [IntegrationKind::PhilipsHue].into_iter().collect()
        );
        assert!(!board.overlay().is_visible());
    }
}
