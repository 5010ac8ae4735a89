//! Class registry
//!
//! Records the classes this module exposes to the host engine, with their
//! parent class and API level. Editor classes exist only in tool builds.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// API level a class is registered under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ClassApi {
    Core,
    Editor,
}

/// A registered class
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub name: &'static str,
    pub parent: &'static str,
    pub is_abstract: bool,
    pub api: ClassApi,
}

/// Registered classes in registration order
#[derive(Clone, Debug, Default, Serialize)]
pub struct ClassRegistry {
    classes: IndexMap<&'static str, ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &'static str, parent: &'static str, is_abstract: bool, api: ClassApi) {
        self.classes.insert(
            name,
            ClassInfo {
                name,
                parent,
                is_abstract,
                api,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn is_abstract(&self, name: &str) -> Option<bool> {
        self.get(name).map(|c| c.is_abstract)
    }

    /// Whether `name` is `ancestor` or derives from it; parents outside the
    /// registry end the walk
    pub fn inherits(&self, name: &str, ancestor: &str) -> bool {
        let Some(mut class) = self.get(name) else {
            return false;
        };
        if class.name == ancestor {
            return true;
        }
        loop {
            if class.parent == ancestor {
                return true;
            }
            match self.get(class.parent) {
                Some(parent) => class = parent,
                None => return false,
            }
        }
    }

    /// Names of the classes that can be instantiated
    pub fn instantiable(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.values().filter(|c| !c.is_abstract).map(|c| c.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Register the module's classes; the scene importer needs a tool build
pub fn register_svg_mesh_types(tools_enabled: bool) -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.register("VGPath", "Node2D", false, ClassApi::Core);
    registry.register("VGPaint", "Resource", true, ClassApi::Core);
    registry.register("VGColor", "VGPaint", false, ClassApi::Core);
    registry.register("VGGradient", "VGPaint", false, ClassApi::Core);
    registry.register("VGLinearGradient", "VGGradient", false, ClassApi::Core);
    registry.register("VGRadialGradient", "VGGradient", false, ClassApi::Core);
    registry.register("VGRenderer", "Resource", true, ClassApi::Core);
    registry.register("VGMeshRenderer", "VGRenderer", false, ClassApi::Core);
    if tools_enabled {
        registry.register(
            "EditorSceneImporterSVG",
            "EditorSceneFormatImporter",
            false,
            ClassApi::Editor,
        );
    }
    debug!(classes = registry.len(), tools_enabled, "registered svg_mesh types");
    registry
}

pub fn unregister_svg_mesh_types() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::get_doc_classes;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_registration_order_and_flags() {
        let registry = register_svg_mesh_types(false);
        let names: Vec<&str> = registry.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "VGPath",
                "VGPaint",
                "VGColor",
                "VGGradient",
                "VGLinearGradient",
                "VGRadialGradient",
                "VGRenderer",
                "VGMeshRenderer",
            ]
        );
        assert_eq!(registry.is_abstract("VGPaint"), Some(true));
        assert_eq!(registry.is_abstract("VGRenderer"), Some(true));
        assert_eq!(registry.is_abstract("VGColor"), Some(false));
        assert_eq!(registry.is_abstract("Nope"), None);
        assert!(!registry.contains("EditorSceneImporterSVG"));
    }

    #[test]
    fn test_editor_importer_needs_tools() {
        let registry = register_svg_mesh_types(true);
        let importer = registry.get("EditorSceneImporterSVG").unwrap();
        assert_eq!(importer.api, ClassApi::Editor);
        assert_eq!(importer.parent, "EditorSceneFormatImporter");
    }

    #[test]
    fn test_registered_classes_match_documented_classes() {
        let registry = register_svg_mesh_types(true);
        let registered: FxHashSet<&str> = registry.iter().map(|c| c.name).collect();
        let documented: FxHashSet<&str> = get_doc_classes().iter().copied().collect();
        assert_eq!(registered, documented);
    }

    #[test]
    fn test_inheritance() {
        let registry = register_svg_mesh_types(true);
        assert!(registry.inherits("VGLinearGradient", "VGGradient"));
        assert!(registry.inherits("VGRadialGradient", "VGPaint"));
        assert!(registry.inherits("VGRadialGradient", "Resource"));
        assert!(registry.inherits("VGMeshRenderer", "VGRenderer"));
        assert!(registry.inherits("VGPath", "Node2D"));
        assert!(registry.inherits("VGColor", "VGColor"));
        assert!(!registry.inherits("VGColor", "VGGradient"));
        assert!(!registry.inherits("Unknown", "Resource"));

        let instantiable: Vec<&str> = registry.instantiable().collect();
        assert!(!instantiable.contains(&"VGPaint"));
        assert!(instantiable.contains(&"VGMeshRenderer"));
        assert_eq!(instantiable.len(), 7);
        unregister_svg_mesh_types();
    }
}
