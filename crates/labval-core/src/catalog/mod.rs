//! Built-in catalog: parameter definitions, global parameters and
//! algorithm templates.

mod globals;
mod parameters;
mod templates;

pub use globals::{GlobalParameter, GlobalParameterKind, default_global_values, global_parameters};
pub use parameters::{
    ParameterDefinition, find_parameter, global_parameter_definitions, parameter_definitions,
    specific_parameter_definitions,
};
pub use templates::{AlgorithmTemplate, TemplateSummary, template, templates};

use crate::types::{ConfigValue, Parameter, ParameterConfig, ValidationType};

/// Names of the other non-blank parameters of an algorithm.
///
/// These are the choices offered for an `interparameter` link from the
/// parameter at index `current`.
pub fn interparameter_options(parameters: &[Parameter], current: usize) -> Vec<String> {
    parameters
        .iter()
        .enumerate()
        .filter(|(i, p)| *i != current && !p.name.trim().is_empty())
        .map(|(_, p)| p.name.clone())
        .collect()
}

/// Default config of an `interparameter` sub-parameter: an exact match
/// against the first other parameter, or an empty value.
pub fn interparameter_config(parameters: &[Parameter], current: usize) -> ParameterConfig {
    let first = interparameter_options(parameters, current)
        .into_iter()
        .next()
        .unwrap_or_default();
    ParameterConfig {
        value: Some(ConfigValue::Text(first)),
        ..ParameterConfig::new(ValidationType::Exact)
    }
}
