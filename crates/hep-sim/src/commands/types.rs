use std::error::Error;

use clap::Args;
use hep_gen::standard_registry;

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Emit the catalog as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &TypesArgs) -> Result<(), Box<dyn Error>> {
    let registry = standard_registry()?;
    if args.json {
        let types: Vec<_> = registry.iter().map(|(_, ty)| ty).collect();
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        for line in registry.describe() {
            println!("{line}");
        }
    }
    Ok(())
}
