use anyhow::Result;
use clap::Args;
use isitgov::lens::utils::OutputFormat;
use isitgov::IsitgovConfig;

/// Arguments for the Lookup command
#[derive(Args)]
pub struct LookupArgs {
    /// Domain names, e.g. "lbl.gov"
    #[clap(required = true)]
    pub domains: Vec<String>,

    /// Display full table (with created/last-update timestamps)
    #[clap(short = 'F', long)]
    pub full_table: bool,
}

pub fn run(config: &IsitgovConfig, args: LookupArgs, format: OutputFormat) -> Result<()> {
    let LookupArgs {
        domains,
        full_table,
    } = args;

    let lens = super::load_registry(config)?;
    let result = lens.lookup(&domains);

    if !result.found.is_empty() {
        println!(
            "{}",
            lens.format_records(&result.found, &format, full_table, false)
        );
    }
    for missing in &result.missing {
        eprintln!("{} is not a registered .gov domain", missing);
    }

    Ok(())
}
