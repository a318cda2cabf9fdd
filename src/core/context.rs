//! Request context - Valore per-richiesta passato esplicitamente dal controller al repository

use uuid::Uuid;

/// Per-request value threaded through controller and repository calls.
///
/// The correlation id ends up on every span opened while serving the request,
/// so all log lines of one request can be grouped together.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: Uuid,
    resource: &'static str,
}

impl RequestContext {
    pub fn new(resource: &'static str) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            resource,
        }
    }

    /// Reuses a correlation id received from the caller
    pub fn with_correlation_id(resource: &'static str, correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            resource,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_context_gets_its_own_correlation_id() {
        let first = RequestContext::new("widgets");
        let second = RequestContext::new("widgets");

        assert_ne!(first.correlation_id(), second.correlation_id());
        assert_eq!(first.resource(), "widgets");
    }

    #[test]
    fn test_forwarded_correlation_id_is_kept() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::with_correlation_id("widgets", id);

        assert_eq!(ctx.correlation_id(), id);
    }
}
