//! Capability probes: stateless yes/no checks against one loading context.
//! Probing is pure with respect to caching (every call re-resolves), and all
//! failure modes collapse to "capability absent".

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::context::LoadingContext;
use crate::resource::type_name_to_resource_path;
use crate::types::TypeInfo;

/// Describes one capability a loading context may or may not provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Every name resolves to a non-absent resource in the context.
    ResourceSet { names: Vec<String> },
    /// The type resolves and itself declares the field, any visibility.
    FieldOn {
        type_name: String,
        field_name: String,
    },
    /// The type resolves, each parameter type resolves through the same
    /// context, and the type provides a method with that exact signature.
    MethodOn {
        type_name: String,
        method_name: String,
        param_type_names: Vec<String>,
    },
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ResourceSet { names } => {
                write!(f, "resources [{}]", names.iter().join(", "))
            }
            Capability::FieldOn {
                type_name,
                field_name,
            } => write!(f, "field {type_name}#{field_name}"),
            Capability::MethodOn {
                type_name,
                method_name,
                param_type_names,
            } => write!(
                f,
                "method {type_name}#{method_name}({})",
                param_type_names.iter().join(", ")
            ),
        }
    }
}

/// Why a probe came up empty. Diagnostic only; callers see a bare `false`.
#[derive(Debug, Error)]
pub(crate) enum Absence {
    #[error("resource not found: {0}")]
    Resource(String),
    #[error("type not found: {0}")]
    Type(String),
    #[error("parameter type not found: {0}")]
    ParamType(String),
    #[error("no field `{field}` declared on {type_name}")]
    Field { type_name: String, field: String },
    #[error("no method `{method}` with matching signature on {type_name}")]
    Method { type_name: String, method: String },
}

/// Check whether `context` provides `capability`. Never caches, never
/// panics outward; every failure is an absent capability.
pub fn probe(context: &dyn LoadingContext, capability: &Capability) -> bool {
    match try_probe(context, capability) {
        Ok(()) => true,
        Err(absence) => {
            trace!(context = context.implementation_name(), %capability, %absence, "capability absent");
            false
        }
    }
}

fn try_probe(context: &dyn LoadingContext, capability: &Capability) -> Result<(), Absence> {
    match capability {
        Capability::ResourceSet { names } => {
            // First missing name wins; the rest are never looked up.
            for name in names {
                if !context.has_resource(&type_name_to_resource_path(name)) {
                    return Err(Absence::Resource(name.clone()));
                }
            }
            Ok(())
        }
        Capability::FieldOn {
            type_name,
            field_name,
        } => {
            let ty = resolve(context, type_name)?;
            if ty.declares_field(field_name) {
                Ok(())
            } else {
                Err(Absence::Field {
                    type_name: type_name.clone(),
                    field: field_name.clone(),
                })
            }
        }
        Capability::MethodOn {
            type_name,
            method_name,
            param_type_names,
        } => {
            let ty = resolve(context, type_name)?;
            let params = param_type_names
                .iter()
                .map(|p| {
                    context
                        .resolve_type(p)
                        .ok_or_else(|| Absence::ParamType(p.clone()))
                })
                .collect::<Result<Vec<Arc<TypeInfo>>, Absence>>()?;
            // Interfaces match their full public method set, inherited
            // included; concrete classes match only what they declare
            // themselves. Inherited methods on a class would say nothing
            // about which library version is on the path.
            let found = if ty.is_interface() {
                ty.has_method(method_name, &params)
            } else {
                ty.declares_method(method_name, &params)
            };
            if found {
                Ok(())
            } else {
                Err(Absence::Method {
                    type_name: type_name.clone(),
                    method: method_name.clone(),
                })
            }
        }
    }
}

fn resolve(context: &dyn LoadingContext, name: &str) -> Result<Arc<TypeInfo>, Absence> {
    context
        .resolve_type(name)
        .ok_or_else(|| Absence::Type(name.to_string()))
}

/// Fail-closed boundary for anything that runs host-runtime code: a probe
/// that unwinds grants nothing. Wrongly denying costs a missed
/// instrumentation opportunity; wrongly granting can corrupt unrelated code
/// paths in the host process.
pub(crate) fn fail_closed<F: FnOnce() -> bool>(f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => v,
        Err(_) => {
            debug!("probe panicked; treating capability as absent");
            false
        }
    }
}
