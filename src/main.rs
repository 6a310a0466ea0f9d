//! jsonapi-core <schema-file>
//!
//! Loads a declarative schema file (toml, json, yaml, ... as told by its
//! extension), registers every type it declares and checks the relationships
//! between them. Each problem is logged; the exit code is non-zero when any
//! was found. Log verbosity follows `RUST_LOG` and defaults to `info`.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use jsonapi_core::{Registry, SchemaDef};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(path) = std::env::args().nth(1) else {
        error!("usage: jsonapi-core <schema-file>");
        return ExitCode::from(2);
    };
    let def = match SchemaDef::from_file(&path) {
        Ok(def) => def,
        Err(e) => {
            error!(file = %path, error = %e, "cannot load schema");
            return ExitCode::FAILURE;
        }
    };

    // definition problems are collected up front so that they can all be
    // reported, registration itself would stop at the first one
    let mut problems = 0;
    for typ in def.types.iter() {
        for e in typ.validate() {
            error!(typ = %typ.name, error = %e, "invalid definition");
            problems += 1;
        }
    }
    if problems > 0 {
        return ExitCode::FAILURE;
    }

    let registry = Registry::new();
    let mut seen = std::collections::HashSet::new();
    for typ in def.types {
        if !seen.insert(typ.name.clone()) {
            error!(typ = %typ.name, "type declared more than once");
            problems += 1;
            continue;
        }
        registry.register_type(typ);
    }
    // the registry logs every integrity problem itself
    problems += registry.check().len();

    if problems > 0 {
        error!(problems, "schema has problems");
        ExitCode::FAILURE
    } else {
        info!(file = %path, types = seen.len(), "schema is valid");
        ExitCode::SUCCESS
    }
}
