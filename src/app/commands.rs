use crate::config::cli::LocalStorage;
use crate::config::toml_config::{CollectionSpec, LoaderConfig};
use crate::config::{CliConfig, Command};
use crate::core::loader::{load_collection, StrapiLoader};
use crate::core::{ContentSource, ServiceConfig, Storage};
use crate::utils::error::{LoaderError, Result};
use serde_json::{Map, Value};

/// Runs the parsed command and returns what should go to stdout.
pub async fn run(cli: &CliConfig) -> Result<String> {
    let file = cli.load_file()?;
    let service = cli.service_config(file.as_ref())?;
    tracing::debug!("Using CMS at {}", service.api_url);

    match &cli.command {
        Command::Content { .. } => {
            let query = cli.command.content_query().ok_or_else(|| LoaderError::Config {
                message: "content command without a query".to_string(),
            })?;
            let records = StrapiLoader::new(service).fetch_content(&query).await?;
            Ok(serde_json::to_string_pretty(&records)?)
        }
        Command::Schema { content_type } => {
            let schema = StrapiLoader::new(service).fetch_schema(content_type).await?;
            Ok(serde_json::to_string_pretty(&schema)?)
        }
        Command::Load { collection, output } => {
            let file = file.ok_or_else(|| LoaderError::Config {
                message: "the load command needs --config".to_string(),
            })?;
            run_load(service, &file, collection.as_deref(), output.as_deref()).await
        }
    }
}

fn select_collections<'a>(
    file: &'a LoaderConfig,
    only: Option<&str>,
) -> Result<Vec<&'a CollectionSpec>> {
    match only {
        Some(name) => file
            .collection(name)
            .map(|spec| vec![spec])
            .ok_or_else(|| LoaderError::Config {
                message: format!("no collection named '{}' in config", name),
            }),
        None => Ok(file.collections.iter().collect()),
    }
}

async fn run_load(
    service: ServiceConfig,
    file: &LoaderConfig,
    only: Option<&str>,
    output: Option<&str>,
) -> Result<String> {
    let specs = select_collections(file, only)?;
    let loader = StrapiLoader::new(service);
    let storage = output.map(|dir| LocalStorage::new(dir.to_string()));

    let mut printed = Map::new();
    for spec in specs {
        let collection = load_collection(&loader, &spec.name, &spec.to_query()).await?;

        match &storage {
            Some(storage) => {
                let filename = format!("{}.json", collection.name);
                let data = serde_json::to_vec_pretty(&collection.entries)?;
                storage.write_file(&filename, &data).await?;
                tracing::info!("💾 Wrote {} entries to {}", collection.entries.len(), filename);
            }
            None => {
                printed.insert(
                    collection.name.clone(),
                    serde_json::to_value(&collection.entries)?,
                );
            }
        }
    }

    if storage.is_some() {
        Ok(String::new())
    } else {
        Ok(serde_json::to_string_pretty(&Value::Object(printed))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn mock_posts(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/get-strapi-schema/schema/post");
            then.status(200).json_body(json!({
                "attributes": {"title": {"type": "string"}}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/posts");
            then.status(200).json_body(json!({
                "data": [{"documentId": "p1", "title": "Hello"}]
            }));
        });
    }

    fn config_file(api_url: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[service]\napi_url = \"{}\"\n\n[[collections]]\nname = \"posts\"\ncontent_type = \"post\"\n",
            api_url
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_schema_command_prints_validator() {
        let server = MockServer::start();
        mock_posts(&server);

        let base_url = server.base_url();
        let cli =
            CliConfig::try_parse_from(["strapi-loader", "--api-url", &base_url, "schema", "post"])
                .unwrap();
        let output = run(&cli).await.unwrap();

        let printed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(printed["title"]["validator"]["kind"], "string");
    }

    #[tokio::test]
    async fn test_load_prints_collections() {
        let server = MockServer::start();
        mock_posts(&server);
        let file = config_file(&server.base_url());

        let cli = CliConfig::try_parse_from([
            "strapi-loader",
            "--config",
            file.path().to_str().unwrap(),
            "load",
        ])
        .unwrap();
        let output = run(&cli).await.unwrap();

        let printed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(printed["posts"][0]["id"], "p1");
        assert_eq!(printed["posts"][0]["data"]["title"], "Hello");
    }

    #[tokio::test]
    async fn test_load_writes_output_files() {
        let server = MockServer::start();
        mock_posts(&server);
        let file = config_file(&server.base_url());
        let out_dir = TempDir::new().unwrap();

        let cli = CliConfig::try_parse_from([
            "strapi-loader",
            "--config",
            file.path().to_str().unwrap(),
            "load",
            "--output",
            out_dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let output = run(&cli).await.unwrap();
        assert!(output.is_empty());

        let written = std::fs::read_to_string(out_dir.path().join("posts.json")).unwrap();
        let entries: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(entries[0]["id"], "p1");
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_config_before_fetching() {
        let server = MockServer::start();
        let any_get = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"data": []}));
        });

        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[service]\napi_url = \"{}\"\nsync_interval = 0\n\n\
             [[collections]]\nname = \"x\"\ncontent_type = \"../admin/x\"\n\n\
             [[collections]]\nname = \"x\"\ncontent_type = \"post\"\n",
            server.base_url()
        )
        .unwrap();

        let cli = CliConfig::try_parse_from([
            "strapi-loader",
            "--config",
            file.path().to_str().unwrap(),
            "load",
        ])
        .unwrap();

        let err = run(&cli).await.unwrap_err();
        assert!(err.is_config_error());
        any_get.assert_hits(0);
    }

    #[tokio::test]
    async fn test_load_unknown_collection() {
        let file = config_file("http://127.0.0.1:9");
        let cli = CliConfig::try_parse_from([
            "strapi-loader",
            "--config",
            file.path().to_str().unwrap(),
            "load",
            "--collection",
            "missing",
        ])
        .unwrap();

        let err = run(&cli).await.unwrap_err();
        assert!(err.is_config_error());
    }
}
