use anyhow::Result;
use clap::Args;
use isitgov::lens::domain::DomainSearchArgs;
use isitgov::lens::utils::OutputFormat;
use isitgov::IsitgovConfig;

/// Arguments for the List command
#[derive(Args)]
pub struct ListArgs {
    #[clap(flatten)]
    pub search: DomainSearchArgs,

    /// Display full table (with created/last-update timestamps)
    #[clap(long)]
    pub full_table: bool,

    /// Do not truncate long agency and organization names in tables
    #[clap(long)]
    pub no_truncate: bool,
}

pub fn run(config: &IsitgovConfig, args: ListArgs, format: OutputFormat) -> Result<()> {
    let ListArgs {
        search,
        full_table,
        no_truncate,
    } = args;

    let lens = super::load_registry(config)?;
    let records = lens.search(&search)?;

    if records.is_empty() {
        eprintln!("no registrations match the given filters");
        return Ok(());
    }

    println!(
        "{}",
        lens.format_records(&records, &format, full_table, !no_truncate)
    );
    Ok(())
}
