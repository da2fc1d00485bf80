//! BoxPersonaService -- type-erased, cloneable PersonaService.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use mutsumi_types::persona::{PersonaError, PersonaReply, PersonaRequest};

use super::service::PersonaService;

/// Object-safe version of [`PersonaService`] with a boxed future.
pub trait PersonaServiceDyn: Send + Sync {
    fn name(&self) -> &str;

    fn send_boxed<'a>(
        &'a self,
        request: &'a PersonaRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PersonaReply, PersonaError>> + Send + 'a>>;
}

impl<T: PersonaService> PersonaServiceDyn for T {
    fn name(&self) -> &str {
        PersonaService::name(self)
    }

    fn send_boxed<'a>(
        &'a self,
        request: &'a PersonaRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PersonaReply, PersonaError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}

/// Shared handle to a persona service.
///
/// Clones share the same client, so an in-flight turn can hold its own
/// handle while the dispatcher is rebound.
#[derive(Clone)]
pub struct BoxPersonaService {
    inner: Arc<dyn PersonaServiceDyn + Send + Sync>,
}

impl BoxPersonaService {
    pub fn new<T: PersonaService + 'static>(service: T) -> Self {
        Self {
            inner: Arc::new(service),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn send(&self, request: &PersonaRequest) -> Result<PersonaReply, PersonaError> {
        self.inner.send_boxed(request).await
    }
}
