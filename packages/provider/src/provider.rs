/**
 * Binding Provider
 *
 * The two entry points a UI-tree traversal calls: `node_has_bindings` and
 * `get_binding_accessors`. Resolution extracts the annotation, compiles it
 * through the shared cache, composes the node's scope and runs the evaluator.
 */
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::bindings::BindingAccessors;
use crate::cache::EvaluatorCache;
use crate::compiler::ExpressionCompiler;
use crate::config::ProviderConfig;
use crate::context::BindingContext;
use crate::error::{BindingResolutionError, ConfigError};
use crate::extractor::AnnotationExtractor;
use crate::node::NodeRef;
use crate::scope;
use crate::virtual_elements::VirtualBindingLocator;

pub type ResolutionResult = Result<Option<BindingAccessors>, BindingResolutionError>;

#[derive(Debug, Clone)]
pub struct BindingProvider {
    config: ProviderConfig,
    extractor: AnnotationExtractor,
    compiler: ExpressionCompiler,
}

impl Default for BindingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingProvider {
    /// Provider reading `data-bind` attributes and `ko` comments, with a fresh cache
    pub fn new() -> Self {
        BindingProvider {
            config: ProviderConfig::default(),
            extractor: AnnotationExtractor::default(),
            compiler: ExpressionCompiler::default(),
        }
    }

    pub fn with_config(config: ProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let locator = config.locator()?;
        Ok(BindingProvider {
            extractor: AnnotationExtractor::new(config.binding_attribute.clone(), Arc::new(locator)),
            compiler: ExpressionCompiler::default(),
            config,
        })
    }

    /// Share `cache` with other providers
    pub fn with_cache(mut self, cache: Arc<EvaluatorCache>) -> Self {
        self.compiler = ExpressionCompiler::new(cache);
        self
    }

    /// Replace the comment convention with a host-supplied one
    pub fn with_locator(mut self, locator: Arc<dyn VirtualBindingLocator>) -> Self {
        self.extractor = AnnotationExtractor::new(self.config.binding_attribute.clone(), locator);
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn extractor(&self) -> &AnnotationExtractor {
        &self.extractor
    }

    pub fn compiler(&self) -> &ExpressionCompiler {
        &self.compiler
    }

    pub fn cache(&self) -> &Arc<EvaluatorCache> {
        self.compiler.cache()
    }

    pub fn node_has_bindings(&self, node: &NodeRef) -> bool {
        self.extractor.has_annotation(node.as_ref())
    }

    /// Resolve the bindings of `node` under `context`; `None` when it has none
    pub fn get_binding_accessors(
        &self,
        node: &NodeRef,
        context: &Arc<BindingContext>,
    ) -> ResolutionResult {
        let Some(text) = self.extractor.extract_text(node.as_ref()) else {
            return Ok(None);
        };
        debug!("resolving bindings [{}] on {}", text, node.describe());

        let evaluator = self
            .compiler
            .compile(&text)
            .map_err(|error| BindingResolutionError::compilation(Arc::clone(node), error))?;

        let scope = scope::compose(context, node);
        let values = evaluator
            .evaluate(&scope)
            .map_err(|cause| BindingResolutionError {
                node: Arc::clone(node),
                bindings_text: text.clone(),
                cause,
            })?;

        Ok(Some(BindingAccessors::new(Arc::clone(node), text, values)))
    }

    /// Resolve many nodes in parallel; results keep input order
    pub fn get_binding_accessors_batch(
        &self,
        items: &[(NodeRef, Arc<BindingContext>)],
    ) -> Vec<ResolutionResult> {
        items
            .par_iter()
            .map(|(node, context)| self.get_binding_accessors(node, context))
            .collect()
    }
}
