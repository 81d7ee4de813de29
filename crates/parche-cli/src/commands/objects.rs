//! Object listing command.

use clap::Args;
use parche_registry::{ObjectCategory, ObjectRegistry};

#[derive(Args)]
pub struct ObjectsArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ObjectsArgs) -> anyhow::Result<()> {
    let registry = ObjectRegistry::new();

    if args.json {
        let objects: Vec<serde_json::Value> = registry
            .all_objects()
            .into_iter()
            .map(|d| {
                serde_json::json!({
                    "tag": d.tag,
                    "name": d.name,
                    "description": d.description,
                    "category": d.category.name(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&objects)?);
        return Ok(());
    }

    for category in [
        ObjectCategory::Generators,
        ObjectCategory::Math,
        ObjectCategory::Io,
        ObjectCategory::Timing,
        ObjectCategory::Resources,
    ] {
        let objects = registry.objects_in_category(category);
        if objects.is_empty() {
            continue;
        }
        println!("{}:", category.name());
        for descriptor in objects {
            println!("  {:<12} {}", descriptor.tag, descriptor.description);
        }
        println!();
    }
    Ok(())
}
