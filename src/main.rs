use clap::Parser;
use strapi_loader::app::commands;
use strapi_loader::utils::{logger, validation::Validate};
use strapi_loader::CliConfig;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting strapi-loader");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    match commands::run(&config).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            tracing::info!("✅ Done");
        }
        Err(e) => {
            tracing::error!("❌ strapi-loader failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
