//! # Types Subcommand
//!
//! Lists the registry's message and enum bindings, one per line, followed by
//! any references to unbound types.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use protojson_registry::TypeRegistry;

/// Arguments for the `protojson types` subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Print the listing as a JSON document.
    #[arg(long)]
    pub json: bool,
}

/// Execute the types subcommand. Returns 1 if any schema references a type
/// with no binding.
pub fn run_types(args: &TypesArgs, registry: &TypeRegistry) -> Result<u8> {
    let dangling = registry.dangling_references();
    if args.json {
        println!("{:#}", listing_json(registry));
    } else {
        print!("{}", listing_text(registry));
    }
    Ok(u8::from(!dangling.is_empty()))
}

/// Plain-text listing.
pub fn listing_text(registry: &TypeRegistry) -> String {
    let mut out = String::new();
    for message in registry.message_types() {
        out.push_str(&format!(
            "message {} -> {} ({} fields)\n",
            message.full_name(),
            message.type_name(),
            message.descriptor().fields().len()
        ));
    }
    for en in registry.enum_types() {
        out.push_str(&format!(
            "enum    {} -> {} ({} values)\n",
            en.full_name(),
            en.type_name(),
            en.descriptor().values().len()
        ));
    }
    for (schema, missing) in registry.dangling_references() {
        out.push_str(&format!("WARN: {schema} references unbound type {missing}\n"));
    }
    out
}

/// JSON listing: `{"messages": [...], "enums": [...], "unbound": [...]}`.
pub fn listing_json(registry: &TypeRegistry) -> serde_json::Value {
    let messages: Vec<_> = registry
        .message_types()
        .map(|m| json!({"fullName": m.full_name(), "typeName": m.type_name()}))
        .collect();
    let enums: Vec<_> = registry
        .enum_types()
        .map(|e| json!({"fullName": e.full_name(), "typeName": e.type_name()}))
        .collect();
    let unbound: Vec<_> = registry
        .dangling_references()
        .into_iter()
        .map(|(schema, missing)| json!({"schema": schema, "missing": missing}))
        .collect();
    json!({"messages": messages, "enums": enums, "unbound": unbound})
}
