use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lens_config::LensConfig;
use lens_core::{Credential, PersonaCatalog, PersonaContext};
use lens_gemini::GeminiClient;
use lens_scan::resolve_context;

const BUILTIN_CATALOG: &str = include_str!("../../assets/personas.toml");

/// Everything a command needs: config, persona catalog, analyzer and credential.
pub struct AppContext {
    pub config: LensConfig,
    pub catalog: PersonaCatalog,
    pub analyzer: Arc<GeminiClient>,
    pub credential: Credential,
}

impl AppContext {
    pub fn init(config: LensConfig) -> anyhow::Result<Self> {
        let catalog = load_catalog(config.personas.catalog_path.as_deref())?;
        let analyzer = Arc::new(GeminiClient::new(&config.gemini));
        let credential = Credential::new(config.gemini.api_key.clone());

        tracing::debug!(
            model = analyzer.model(),
            personas = catalog.personas.len(),
            credential = ?credential,
            "context initialized"
        );

        Ok(Self {
            config,
            catalog,
            analyzer,
            credential,
        })
    }

    /// Resolve the persona selection, falling back to configured defaults
    /// when no persona was given.
    pub fn initial_context(
        &self,
        persona: Option<&str>,
        sub_option: Option<&str>,
    ) -> Option<PersonaContext> {
        let (persona, sub_option) = match persona {
            Some(persona) => (Some(persona), sub_option),
            None => (
                self.config.personas.default_persona.as_deref(),
                self.config.personas.default_sub_option.as_deref(),
            ),
        };
        self.resolve(persona, sub_option)
    }

    /// Resolve a selection, warning when it names something the catalog lacks.
    pub fn resolve(
        &self,
        persona: Option<&str>,
        sub_option: Option<&str>,
    ) -> Option<PersonaContext> {
        let context = resolve_context(&self.catalog, persona, sub_option);
        if let (None, Some(persona_id)) = (&context, persona) {
            match self.catalog.persona(persona_id) {
                None => tracing::warn!(persona = persona_id, "unknown persona; analyzing without one"),
                Some(found) => {
                    let choices = found.sub_options.keys().cloned().collect::<Vec<_>>().join(", ");
                    tracing::warn!(
                        persona = persona_id,
                        sub_option,
                        choices = %choices,
                        "persona needs a known sub-option; analyzing without one"
                    );
                }
            }
        }
        context
    }
}

fn load_catalog(path: Option<&str>) -> anyhow::Result<PersonaCatalog> {
    match path {
        Some(path) => PersonaCatalog::load(Path::new(path))
            .with_context(|| format!("failed to load persona catalog {path}")),
        None => PersonaCatalog::from_toml_str(BUILTIN_CATALOG)
            .context("built-in persona catalog is invalid"),
    }
}
