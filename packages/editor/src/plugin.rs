//! Plugins bundle a schema layer with the hook that repairs its violations.

use crate::normalizer::NormalizeHook;
use folio_schema::SchemaLayer;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Plugin {
    pub name: String,
    pub layer: Option<SchemaLayer>,
    pub hook: Option<Arc<dyn NormalizeHook>>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: None,
            hook: None,
        }
    }

    pub fn with_layer(mut self, layer: SchemaLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_hook(mut self, hook: impl NormalizeHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Layer name the hook is registered under: the layer's own name, or
    /// the plugin name for a hook without a layer
    pub fn hook_layer(&self) -> &str {
        self.layer.as_ref().map_or(self.name.as_str(), SchemaLayer::name)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("layer", &self.layer.as_ref().map(SchemaLayer::name))
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
