pub mod board;
pub mod config;
pub mod error;
pub mod gateway;
pub mod integration;
pub mod log_buffer;
pub mod log_tail;
pub mod model;
pub mod overlay;
pub mod registry;

pub use board::IntegrationBoard;
pub use error::{IntegrationError, Phase};
pub use gateway::{ConnectionGateway, FieldMap, GatewayFuture, RequestOutcome};
pub use integration::{ConfirmPrompt, IntegrationController, IntegrationState};
pub use log_buffer::{LogBuffer, LogEntry};
pub use log_tail::{LogSource, LogTailer, TailerConfig, TailerHandle};
pub use model::{FormMode, IntegrationKind, ServiceResponse};
pub use overlay::OverlayCoordinator;
pub use registry::{IntegrationDefinition, IntegrationRegistry};
