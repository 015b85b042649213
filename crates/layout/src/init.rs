//! Startup: session, string bundle, layout, runtime maps and projections,
//! ending in exactly one INIT_APP or INIT_ERROR.

use client::{MapAgent, ProjectionResolver, get_resource};
use commands::{
    Action, CommandRegistry, DEFAULT_LOCALE, Dispatcher, ExternalBaseLayer, InitAppPayload,
    InitErrorAction, InitOptions,
};
use contracts::fusion::ApplicationDefinition;
use contracts::weblayout::WebLayout;
use foundation::math::ProjectionTable;
use i18n::StringBundles;
use tracing::{error, info, warn};

use crate::error::InitError;
use crate::flex::normalize_flex_layout;
use crate::maps::map_definitions_from_flex;
use crate::provision::{create_runtime_maps, ensure_projections};
use crate::web::normalize_web_layout;

pub const ANONYMOUS_USER: &str = "Anonymous";

/// Which layout schema a resource id names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayoutKind {
    WebLayout,
    ApplicationDefinition,
}

impl LayoutKind {
    pub fn of(resource_id: &str) -> Option<Self> {
        if resource_id.ends_with("WebLayout") {
            Some(LayoutKind::WebLayout)
        } else if resource_id.ends_with("ApplicationDefinition") {
            Some(LayoutKind::ApplicationDefinition)
        } else {
            None
        }
    }
}

/// Registries filled in during startup and read for the rest of the session.
#[derive(Debug, Default)]
pub struct AppContext {
    pub commands: CommandRegistry,
    pub strings: StringBundles,
    pub projections: ProjectionTable,
}

/// Server collaborators used during startup.
pub struct Initializer<'a> {
    agent: &'a dyn MapAgent,
    resolver: &'a dyn ProjectionResolver,
    external_base_layers: Vec<ExternalBaseLayer>,
}

impl<'a> Initializer<'a> {
    pub fn new(agent: &'a dyn MapAgent, resolver: &'a dyn ProjectionResolver) -> Self {
        Self {
            agent,
            resolver,
            external_base_layers: Vec::new(),
        }
    }

    /// Base layers attached to the map of a WebLayout.
    pub fn with_external_base_layers(mut self, layers: Vec<ExternalBaseLayer>) -> Self {
        self.external_base_layers = layers;
        self
    }

    /// Runs startup and dispatches its single outcome.
    pub async fn init_layout(
        &self,
        options: InitOptions,
        app: &mut AppContext,
        dispatcher: &mut dyn Dispatcher,
    ) {
        match self.build(&options, app).await {
            Ok(payload) => {
                info!("initialized viewer with active map {}", payload.active_map_name);
                dispatcher.dispatch(Action::InitApp(Box::new(payload)));
            }
            Err(err) => {
                error!("viewer initialization failed: {err}");
                dispatcher.dispatch(Action::InitError(InitErrorAction {
                    error: err.to_payload(),
                    include_stack: err.include_stack(),
                    options,
                }));
            }
        }
    }

    /// Startup without dispatch.
    pub async fn build(
        &self,
        options: &InitOptions,
        app: &mut AppContext,
    ) -> Result<InitAppPayload, InitError> {
        let locale = options.locale.as_str();
        let Some(resource_id) = options.resource_id.as_deref() else {
            return Err(InitError::MissingResource(app.strings.tr(
                "INIT_ERROR_MISSING_RESOURCE_PARAM",
                locale,
                &[],
            )));
        };
        let Some(kind) = LayoutKind::of(resource_id) else {
            return Err(InitError::UnknownResourceType(app.strings.tr(
                "INIT_ERROR_UNKNOWN_RESOURCE_TYPE",
                locale,
                &[("resourceId", resource_id)],
            )));
        };

        let session = match options.session.as_deref() {
            Some(s) => s.to_string(),
            None => self.agent.create_session(ANONYMOUS_USER, "").await?,
        };

        if locale != DEFAULT_LOCALE {
            self.load_string_bundle(locale, &mut app.strings).await;
        }

        match kind {
            LayoutKind::WebLayout => {
                let layout: WebLayout = get_resource(self.agent, resource_id, &session).await?;
                let maps =
                    create_runtime_maps(self.agent, &session, &[layout.map.resource_id.clone()])
                        .await?;
                ensure_projections(&maps, self.resolver, &mut app.projections, &app.strings, locale)
                    .await?;
                Ok(normalize_web_layout(
                    &layout,
                    &maps,
                    options,
                    &self.external_base_layers,
                    &mut app.commands,
                    &app.strings,
                ))
            }
            LayoutKind::ApplicationDefinition => {
                let app_def: ApplicationDefinition =
                    get_resource(self.agent, resource_id, &session).await?;
                let definitions = map_definitions_from_flex(&app_def);
                if definitions.is_empty() {
                    return Err(InitError::NoMapDefinition(app.strings.tr(
                        "INIT_ERROR_NO_MAP_DEFINITION",
                        locale,
                        &[],
                    )));
                }
                let maps = create_runtime_maps(self.agent, &session, &definitions).await?;
                ensure_projections(&maps, self.resolver, &mut app.projections, &app.strings, locale)
                    .await?;
                Ok(normalize_flex_layout(
                    &app_def,
                    &maps,
                    options,
                    &mut app.commands,
                    &app.strings,
                ))
            }
        }
    }

    /// A missing or broken bundle is logged and startup continues.
    async fn load_string_bundle(&self, locale: &str, strings: &mut StringBundles) {
        match self.agent.fetch_string_bundle(locale).await {
            Ok(Some(bundle)) => match strings.register_json(locale, bundle) {
                Ok(()) => info!("Registered string bundle for locale: {locale}"),
                Err(e) => warn!("Failed to register string bundle for locale: {locale}: {e}"),
            },
            Ok(None) => warn!("Failed to register string bundle for locale: {locale}"),
            Err(e) => warn!("Failed to register string bundle for locale: {locale}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeAgent, FakeResolver, app_def_json, web_layout_json};
    use pretty_assertions::assert_eq;

    async fn run(
        agent: &FakeAgent,
        resolver: &FakeResolver,
        options: InitOptions,
        app: &mut AppContext,
    ) -> Vec<Action> {
        let mut actions: Vec<Action> = Vec::new();
        Initializer::new(agent, resolver)
            .init_layout(options, app, &mut actions)
            .await;
        actions
    }

    fn options(resource: &str) -> InitOptions {
        InitOptions::from_query(&format!("resource={resource}"))
    }

    fn init_error(actions: &[Action]) -> &InitErrorAction {
        match actions {
            [Action::InitError(e)] => e,
            other => panic!("expected a single INIT_ERROR, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_resource_is_reported_without_stack() {
        let agent = FakeAgent::default();
        let actions = run(&agent, &FakeResolver::default(), InitOptions::default(), &mut AppContext::default()).await;
        let e = init_error(&actions);
        assert!(!e.include_stack);
        assert_eq!(
            e.error.message,
            "Missing required 'resource' parameter in the query string"
        );
        assert_eq!(agent.sessions_created(), 0);
    }

    #[tokio::test]
    async fn unknown_resource_type_is_reported_without_stack() {
        let agent = FakeAgent::default();
        let actions = run(
            &agent,
            &FakeResolver::default(),
            options("Library://Foo.FeatureSource"),
            &mut AppContext::default(),
        ).await;
        let e = init_error(&actions);
        assert!(!e.include_stack);
        assert!(e.error.message.contains("Library://Foo.FeatureSource"));
    }

    #[tokio::test]
    async fn web_layout_initializes_with_anonymous_session() {
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("4326");
        let mut app = AppContext::default();
        let actions = run(&agent, &FakeResolver::default(), options("Library://Sheboygan.WebLayout"), &mut app).await;

        let [Action::InitApp(payload)] = actions.as_slice() else {
            panic!("expected INIT_APP, got {actions:?}");
        };
        assert_eq!(agent.sessions_created(), 1);
        assert!(payload.active_map_name.starts_with("Sheboygan_"));
        assert_eq!(payload.maps[0].map.session_id, "session-1");
        assert!(app.commands.contains("Parcel Report"));
    }

    #[tokio::test]
    async fn supplied_session_skips_session_creation() {
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("4326");
        let opts = InitOptions::from_query("resource=Library://Sheboygan.WebLayout&session=abc");
        let actions = run(&agent, &FakeResolver::default(), opts, &mut AppContext::default()).await;
        assert!(matches!(actions.as_slice(), [Action::InitApp(_)]));
        assert_eq!(agent.sessions_created(), 0);
    }

    #[tokio::test]
    async fn zero_epsg_in_batch_fails_without_init_app() {
        let agent = FakeAgent::default()
            .with_resource("Library://Fusion.ApplicationDefinition", app_def_json())
            .with_epsg("0");
        let actions = run(
            &agent,
            &FakeResolver::default(),
            options("Library://Fusion.ApplicationDefinition"),
            &mut AppContext::default(),
        ).await;
        let e = init_error(&actions);
        assert!(e.include_stack);
        assert!(e.error.message.contains("cannot be converted to a known EPSG code"));
        assert_eq!(agent.maps_created(), 2);
    }

    #[tokio::test]
    async fn unknown_epsg_is_resolved_and_registered() {
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("27700");
        let resolver = FakeResolver::default().with("27700", "+proj=tmerc +units=m +no_defs");
        let mut app = AppContext::default();
        let actions = run(&agent, &resolver, options("Library://Sheboygan.WebLayout"), &mut app).await;
        assert!(matches!(actions.as_slice(), [Action::InitApp(_)]));
        assert!(app.projections.is_registered("27700"));
        assert_eq!(resolver.lookups(), vec!["27700".to_string()]);
    }

    #[tokio::test]
    async fn unresolvable_epsg_fails() {
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("99999");
        let mut app = AppContext::default();
        let actions = run(&agent, &FakeResolver::default(), options("Library://Sheboygan.WebLayout"), &mut app).await;
        let e = init_error(&actions);
        assert!(e.error.message.contains("EPSG:99999"));
        assert!(!app.projections.is_registered("99999"));
    }

    #[tokio::test]
    async fn flex_layout_creates_one_map_per_definition() {
        let agent = FakeAgent::default()
            .with_resource("Library://Fusion.ApplicationDefinition", app_def_json())
            .with_epsg("3857");
        let actions = run(
            &agent,
            &FakeResolver::default(),
            options("Library://Fusion.ApplicationDefinition"),
            &mut AppContext::default(),
        ).await;
        let [Action::InitApp(payload)] = actions.as_slice() else {
            panic!("expected INIT_APP, got {actions:?}");
        };
        assert_eq!(agent.maps_created(), 2);
        assert_eq!(payload.maps.len(), 1);
        assert_eq!(payload.maps[0].map_group_id, "SheboyganAgain");
    }

    #[tokio::test]
    async fn flex_layout_without_mapguide_maps_fails() {
        let agent = FakeAgent::default()
            .with_resource(
                "Library://Empty.ApplicationDefinition",
                serde_json::json!({ "Title": "Empty", "WidgetSet": [] }),
            )
            .with_epsg("3857");
        let actions = run(
            &agent,
            &FakeResolver::default(),
            options("Library://Empty.ApplicationDefinition"),
            &mut AppContext::default(),
        ).await;
        let e = init_error(&actions);
        assert_eq!(e.error.message, "No Map Definition found in Application Definition");
        assert_eq!(agent.maps_created(), 0);
    }

    #[tokio::test]
    async fn missing_layout_surfaces_client_error() {
        let agent = FakeAgent::default().with_epsg("4326");
        let actions = run(
            &agent,
            &FakeResolver::default(),
            options("Library://Gone.WebLayout"),
            &mut AppContext::default(),
        ).await;
        let e = init_error(&actions);
        assert!(e.include_stack);
        assert!(!e.error.stack.is_empty());
    }

    #[tokio::test]
    async fn non_default_locale_loads_bundle() {
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("4326")
            .with_bundle("de", serde_json::json!({ "ERROR": "Fehler" }));
        let mut app = AppContext::default();
        let opts = InitOptions::from_query("resource=Library://Sheboygan.WebLayout&locale=de");
        let actions = run(&agent, &FakeResolver::default(), opts, &mut app).await;
        let [Action::InitApp(payload)] = actions.as_slice() else {
            panic!("expected INIT_APP");
        };
        assert_eq!(payload.locale, "de");
        assert_eq!(app.strings.tr("ERROR", "de", &[]), "Fehler");

        // A locale without a bundle still initializes.
        let agent = FakeAgent::default()
            .with_resource("Library://Sheboygan.WebLayout", web_layout_json())
            .with_epsg("4326");
        let opts = InitOptions::from_query("resource=Library://Sheboygan.WebLayout&locale=fr");
        let actions = run(&agent, &FakeResolver::default(), opts, &mut AppContext::default()).await;
        assert!(matches!(actions.as_slice(), [Action::InitApp(_)]));
    }

    #[test]
    fn layout_kind_from_resource_suffix() {
        assert_eq!(LayoutKind::of("Library://A.WebLayout"), Some(LayoutKind::WebLayout));
        assert_eq!(LayoutKind::of("Library://A.MapDefinition"), None);
    }
}
