//! The seven built-in stage definitions, in wizard order

pub mod changelog;
pub mod dependencies;
pub mod details;
pub mod environment;
pub mod files;
pub mod loaders;
pub mod targets;

use crate::stage::StageDefinition;

/// Built-in definitions in registry order
pub fn builtin() -> Vec<StageDefinition> {
    vec![
        files::DEFINITION,
        details::DEFINITION,
        loaders::DEFINITION,
        targets::DEFINITION,
        environment::DEFINITION,
        dependencies::DEFINITION,
        changelog::DEFINITION,
    ]
}
