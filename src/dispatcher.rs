//! Request dispatch: access gate, version resolution, parameter checks,
//! handler invocation and the single terminal envelope.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    audit::redact_fields,
    context::RequestContext,
    envelope::{wrap_result, ResponseEnvelope},
    errors::DispatchError,
    registry::{MethodDescriptor, MethodRegistry, MethodResult, DEFAULT_TIER},
};

/// Outcome of a non-terminal required-parameter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamCheck {
    Complete,
    Missing(String),
}

/// Checks `params` against the request in declaration order.
///
/// Without `wrap_on_failure` the first missing name is reported back as
/// [`ParamCheck::Missing`]. With it, the same situation is returned as a
/// `MISSING_PARAMS` error which a handler propagates with `?`, ending the
/// dispatch exactly like the dispatcher's own validation does.
pub fn check_required_params<S: AsRef<str>>(
    params: &[S],
    ctx: &RequestContext,
    wrap_on_failure: bool,
) -> Result<ParamCheck, DispatchError> {
    match first_missing_param(params, ctx) {
        None => Ok(ParamCheck::Complete),
        Some(name) if wrap_on_failure => Err(DispatchError::missing_param(name)),
        Some(name) => Ok(ParamCheck::Missing(name.to_string())),
    }
}

pub fn first_missing_param<'a, S: AsRef<str>>(
    params: &'a [S],
    ctx: &RequestContext,
) -> Option<&'a str> {
    params
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !ctx.contains(name))
}

pub fn require_params<S: AsRef<str>>(
    params: &[S],
    ctx: &RequestContext,
) -> Result<(), DispatchError> {
    check_required_params(params, ctx, true).map(|_| ())
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: MethodRegistry,
    secure_key: Option<String>,
}

impl Dispatcher {
    pub fn new(registry: MethodRegistry) -> Self {
        Self {
            registry,
            secure_key: None,
        }
    }

    /// Enables the access gate. An empty key leaves it disabled.
    pub fn set_secure_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.secure_key = (!key.is_empty()).then_some(key);
    }

    pub fn access_control_enabled(&self) -> bool {
        self.secure_key.is_some()
    }

    pub fn register<F>(
        &mut self,
        version: impl Into<String>,
        name: impl Into<String>,
        required_params: &[&str],
        handler: F,
    ) where
        F: Fn(&RequestContext) -> MethodResult + Send + Sync + 'static,
    {
        self.registry.register(version, name, required_params, handler);
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Runs one request to completion and returns its only envelope.
    pub fn handle_request(&self, ctx: &RequestContext) -> ResponseEnvelope {
        let method = ctx.method();
        let version = ctx.version();

        let (tier, envelope) = match self.dispatch(ctx, &method, &version) {
            Ok((tier, data)) => (Some(tier), wrap_result(data)),
            Err(err) => (None, err.into_envelope()),
        };

        info!(
            method = %method,
            version = %version,
            tier = tier.as_deref().unwrap_or("-"),
            fields = %redact_fields(ctx.fields()),
            outcome = if envelope.is_ok() { "success" } else { "failure" },
            code = envelope.error_code().unwrap_or(0),
            "dispatch audited"
        );

        envelope
    }

    fn dispatch(
        &self,
        ctx: &RequestContext,
        method: &str,
        version: &str,
    ) -> Result<(String, Map<String, Value>), DispatchError> {
        self.check_access(ctx)?;
        let descriptor = self.resolve(method, version)?;
        require_params(&descriptor.required_params, ctx)?;
        let data = (descriptor.handler)(ctx)?;
        Ok((descriptor.version.clone(), data))
    }

    pub fn check_access(&self, ctx: &RequestContext) -> Result<(), DispatchError> {
        let Some(expected) = self.secure_key.as_deref() else {
            return Ok(());
        };

        match ctx.key() {
            Some(provided) if provided == expected => Ok(()),
            provided => {
                warn!(
                    key_supplied = provided.is_some(),
                    "access denied for dispatch request"
                );
                Err(DispatchError::AccessDenied)
            }
        }
    }

    /// Exact version first, then the `"default"` tier. Nothing else.
    pub fn resolve(
        &self,
        method: &str,
        version: &str,
    ) -> Result<Arc<MethodDescriptor>, DispatchError> {
        if let Some(descriptor) = self.registry.lookup(version, method) {
            return Ok(descriptor);
        }

        let descriptor = self
            .registry
            .lookup(DEFAULT_TIER, method)
            .ok_or(DispatchError::UnknownMethod)?;
        debug!(method, version, "resolved through default tier");
        Ok(descriptor)
    }
}
