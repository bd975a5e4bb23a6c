//! Email notifications for the bistro services.
//!
//! The notification worker reads every integration event from the
//! `bistro:events` stream and turns the ones customers care about into email.
//!
//! ## Components
//!
//! - **Processing**: `NotificationProcessor` implements `StreamProcessor<IntegrationEvent>`
//! - **Models**: `Email`
//! - **Providers**: `SmtpProvider` (lettre) and `MockEmailProvider`
//! - **Templates**: Handlebars-based `TemplateEngine` with the built-in templates
//!
//! ## Usage
//!
//! ```ignore
//! use contracts::BistroEvents;
//! use email::{NotificationProcessor, NotificationSettings, SmtpConfig, SmtpProvider, TemplateEngine};
//! use stream_worker::{StreamWorker, WorkerConfig};
//!
//! let provider = SmtpProvider::new(SmtpConfig::from_env()?)?;
//! let processor = NotificationProcessor::new(provider, TemplateEngine::new()?, settings);
//! let config = WorkerConfig::from_stream_def::<BistroEvents>("notifications");
//! StreamWorker::new(redis, Arc::new(processor), config).run(shutdown_rx).await?;
//! ```

pub mod error;
pub mod models;
pub mod processor;
pub mod provider;
pub mod templates;

pub use error::{NotificationError, NotificationResult};
pub use models::Email;
pub use processor::{NotificationProcessor, NotificationSettings, format_money, short_ref};
pub use provider::{EmailProvider, MockEmailProvider, SendResult, SmtpConfig, SmtpProvider};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
