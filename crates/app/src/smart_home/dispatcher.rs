//! Directive dispatcher: one request in, exactly one envelope out.

use serde_json::{Value, json};

use voicebridge_domain::entity::view::EntityView;
use voicebridge_domain::error::BridgeError;
use voicebridge_domain::event::{Event, EventType};
use voicebridge_domain::id::ContextId;

use super::capabilities::{Interface, capabilities_for};
use super::config::BridgeConfig;
use super::discovery::{discover, is_exposed};
use super::error::{DirectiveError, ErrorType, ProtocolError};
use super::handlers::{DirectiveContext, plan};
use super::message::{Directive, Response};
use super::properties::{Property, read_property, report_state};
use crate::ports::{EventPublisher, ExposurePolicy, StateStore};

const ALEXA: &str = "Alexa";
const DISCOVERY: &str = "Alexa.Discovery";
const AUTHORIZATION: &str = "Alexa.Authorization";

/// Where a directive goes once its namespace and name are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Discover,
    AcceptGrant,
    ReportState,
    Interface(Interface),
}

impl Route {
    fn of(directive: &Directive) -> Option<Self> {
        match (directive.namespace(), directive.name()) {
            (DISCOVERY, "Discover") => Some(Self::Discover),
            (AUTHORIZATION, "AcceptGrant") => Some(Self::AcceptGrant),
            (ALEXA, "ReportState") => Some(Self::ReportState),
            (namespace, name) => Interface::from_namespace(namespace)
                .filter(|interface| interface.directives().contains(&name))
                .map(Self::Interface),
        }
    }
}

/// The smart-home bridge bound to one hub and one configuration.
///
/// Holds no state between directives; rebuilding it is how configuration
/// changes take effect.
pub struct SmartHome<S, P, X = BridgeConfig> {
    store: S,
    publisher: P,
    config: BridgeConfig,
    policy: X,
}

impl<S, P> SmartHome<S, P>
where
    S: StateStore,
    P: EventPublisher,
{
    /// A bridge whose exposure policy is the configuration's own filter
    /// and per-entity overrides.
    pub fn new(store: S, publisher: P, config: BridgeConfig) -> Self {
        let policy = config.clone();
        Self::with_policy(store, publisher, config, policy)
    }
}

impl<S, P, X> SmartHome<S, P, X>
where
    S: StateStore,
    P: EventPublisher,
    X: ExposurePolicy,
{
    /// A bridge with an externally supplied exposure policy.
    pub fn with_policy(store: S, publisher: P, config: BridgeConfig, policy: X) -> Self {
        Self {
            store,
            publisher,
            config,
            policy,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle one raw request and return the response envelope.
    ///
    /// Every failure after the envelope has been parsed is answered with an
    /// `Alexa/ErrorResponse`. One event is published per handled directive,
    /// stamped with `context` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] when the request is not a directive
    /// envelope or its payload version is not supported.
    pub async fn handle_message(
        &self,
        request: Value,
        context: Option<ContextId>,
    ) -> Result<Value, ProtocolError> {
        let directive = Directive::from_value(request)?;
        tracing::debug!(
            namespace = directive.namespace(),
            name = directive.name(),
            endpoint_id = directive.endpoint_id(),
            "handling directive"
        );

        let response = match self.dispatch(&directive).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    namespace = directive.namespace(),
                    name = directive.name(),
                    error_type = %err.error_type,
                    message = %err.message,
                    "directive failed"
                );
                directive.error_response(&err)
            }
        };

        self.publish(&directive, &response, context).await;
        Ok(response.into_json())
    }

    async fn dispatch(&self, directive: &Directive) -> Result<Response, DirectiveError> {
        let route = Route::of(directive);

        if !self.config.enabled && route != Some(Route::Discover) {
            return Err(DirectiveError::new(
                ErrorType::BridgeUnreachable,
                "the bridge is disabled",
            ));
        }

        let Some(route) = route else {
            // a missing endpoint takes precedence over an unknown directive
            if directive.endpoint_id().is_some() {
                self.resolve(directive).await?;
            }
            return Err(DirectiveError::internal(format!(
                "unsupported directive {}.{}",
                directive.namespace(),
                directive.name()
            )));
        };

        match route {
            Route::Discover => self.discover(directive).await,
            Route::AcceptGrant => Ok(directive
                .response()
                .named(AUTHORIZATION, "AcceptGrant.Response")),
            Route::ReportState => {
                let view = self.resolve(directive).await?;
                let capabilities = capabilities_for(&view);
                let properties = report_state(&view, &capabilities, self.config.temperature_unit);
                Ok(directive
                    .response()
                    .named(ALEXA, "StateReport")
                    .with_properties(properties))
            }
            Route::Interface(interface) => self.execute(directive, interface).await,
        }
    }

    async fn discover(&self, directive: &Directive) -> Result<Response, DirectiveError> {
        let records = self.store.all_states().await.map_err(|err| store_failure(&err))?;
        let endpoints = discover(&records, &self.policy, &self.config.product_name);
        tracing::info!(
            entities = records.len(),
            endpoints = endpoints.len(),
            "discovery completed"
        );
        Ok(directive
            .response()
            .named(DISCOVERY, "Discover.Response")
            .with_payload(json!({ "endpoints": endpoints })))
    }

    /// The exposed entity a directive targets.
    async fn resolve(&self, directive: &Directive) -> Result<EntityView, DirectiveError> {
        let unknown = || {
            DirectiveError::no_such_endpoint(format!(
                "unable to find endpoint {:?}",
                directive.endpoint_id().unwrap_or_default()
            ))
        };

        let entity_id = directive.entity_id().ok_or_else(unknown)?;
        if !is_exposed(&self.policy, &entity_id) {
            return Err(unknown());
        }
        let record = self
            .store
            .get_state(&entity_id)
            .await
            .map_err(|err| store_failure(&err))?
            .ok_or_else(unknown)?;
        EntityView::from_record(&record).map_err(|_| unknown())
    }

    async fn execute(
        &self,
        directive: &Directive,
        interface: Interface,
    ) -> Result<Response, DirectiveError> {
        let view = self.resolve(directive).await?;
        let capabilities = capabilities_for(&view);
        if !capabilities
            .iter()
            .any(|capability| capability.accepts(interface, directive.instance()))
        {
            return Err(DirectiveError::invalid_directive(format!(
                "{} does not support {}.{}",
                view.entity_id,
                directive.namespace(),
                directive.name()
            )));
        }

        let hub_unit = self.config.temperature_unit;
        let outcome = plan(
            interface,
            &DirectiveContext {
                directive,
                view: &view,
                hub_unit,
            },
        )?;

        let call = outcome.call.to_string();
        self.store.call_service(outcome.call).await.map_err(|err| {
            tracing::error!(service = %call, entity_id = %view.entity_id, error = %err, "service call failed");
            DirectiveError::internal(format!("{call} failed: {err}"))
        })?;

        let mut response = directive.response();
        if let Some((namespace, name, payload)) = outcome.response {
            response = response.named(namespace, name).with_payload(payload);
        }
        let health = read_property(&view, Interface::EndpointHealth, "connectivity", hub_unit)
            .map(|value| Property::new(Interface::EndpointHealth, "connectivity", value));
        Ok(response.with_properties(outcome.properties).with_properties(health))
    }

    async fn publish(&self, directive: &Directive, response: &Response, context: Option<ContextId>) {
        let entity_id = directive.entity_id();
        let mut request = json!({
            "namespace": directive.namespace(),
            "name": directive.name(),
        });
        if let Some(entity_id) = &entity_id {
            request["entity_id"] = json!(entity_id.as_str());
        }
        let data = json!({
            "request": request,
            "response": {
                "namespace": response.namespace(),
                "name": response.name(),
            },
        });

        let event = Event::new(EventType::SmartHome, entity_id, data);
        let event = match context {
            Some(context) => event.with_context(context),
            None => event,
        };
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish smart-home event");
        }
    }
}

fn store_failure(err: &BridgeError) -> DirectiveError {
    tracing::error!(error = %err, "state store failed");
    DirectiveError::internal(err.to_string())
}
