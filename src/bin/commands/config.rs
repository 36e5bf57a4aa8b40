use anyhow::Result;
use isitgov::lens::utils::OutputFormat;
use isitgov::IsitgovConfig;

pub fn run(config: &IsitgovConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(config)?),
        f if f.is_json() => println!("{}", serde_json::to_string(config)?),
        _ => {
            println!("Config File:        {}", IsitgovConfig::config_file_path());
            println!("{}", config.summary());
        }
    }
    Ok(())
}
