//! Build manifest hooks
//!
//! The host build orchestrator asks every module whether it can be built for
//! the current environment, lets it adjust the environment, and collects the
//! classes it documents.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of a build variable
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl EnvValue {
    /// Truthiness as build scripts read it
    pub fn is_truthy(&self) -> bool {
        match self {
            EnvValue::Bool(b) => *b,
            EnvValue::Int(i) => *i != 0,
            EnvValue::Str(s) => !matches!(s.as_str(), "" | "no" | "false" | "0"),
        }
    }
}

impl From<bool> for EnvValue {
    fn from(b: bool) -> Self {
        EnvValue::Bool(b)
    }
}

impl From<i64> for EnvValue {
    fn from(i: i64) -> Self {
        EnvValue::Int(i)
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::Str(s.to_string())
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            EnvValue::Int(i) => write!(f, "{i}"),
            EnvValue::Str(s) => f.write_str(s),
        }
    }
}

/// Build variables in insertion order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildEnv {
    vars: IndexMap<String, EnvValue>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<EnvValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<EnvValue>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Hooks a module exposes to the build orchestrator
pub trait ModuleConfig {
    fn can_build(&self, env: &BuildEnv, platform: &str) -> bool;

    fn configure(&self, env: &mut BuildEnv);

    /// Directory holding the module's class reference
    fn doc_path(&self) -> &'static str;

    /// Classes documented by the module, in documentation order
    fn doc_classes(&self) -> &'static [&'static str];
}

/// Manifest of the svg_mesh module
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgMeshModule;

const DOC_CLASSES: [&str; 9] = [
    "VGColor",
    "VGGradient",
    "VGLinearGradient",
    "VGMeshRenderer",
    "VGPaint",
    "VGPath",
    "VGRadialGradient",
    "VGRenderer",
    "EditorSceneImporterSVG",
];

impl ModuleConfig for SvgMeshModule {
    /// Buildable only in tool builds; a missing `tools` entry means no
    fn can_build(&self, env: &BuildEnv, _platform: &str) -> bool {
        env.get("tools").is_some_and(EnvValue::is_truthy)
    }

    fn configure(&self, _env: &mut BuildEnv) {}

    fn doc_path(&self) -> &'static str {
        "doc_classes"
    }

    fn doc_classes(&self) -> &'static [&'static str] {
        &DOC_CLASSES
    }
}

pub fn can_build(env: &BuildEnv, platform: &str) -> bool {
    SvgMeshModule.can_build(env, platform)
}

pub fn configure(env: &mut BuildEnv) {
    SvgMeshModule.configure(env)
}

pub fn get_doc_path() -> &'static str {
    SvgMeshModule.doc_path()
}

pub fn get_doc_classes() -> &'static [&'static str] {
    SvgMeshModule.doc_classes()
}
