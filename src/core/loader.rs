use crate::core::gateway::FetchGateway;
use crate::core::query::{content_params, QueryParams};
use crate::core::schema::{translate_attributes, ContentSchema};
use crate::domain::model::{
    record_id, ContentQuery, ContentRecord, Entry, LoadedCollection, ServiceConfig,
};
use crate::domain::ports::{ConfigProvider, ContentSource};
use crate::utils::error::{LoaderError, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const SCHEMA_PATH_PREFIX: &str = "/get-strapi-schema/schema/";

pub fn schema_path(content_type: &str) -> String {
    format!("{}{}", SCHEMA_PATH_PREFIX, content_type)
}

/// Takes the `data` sequence out of a content response.
pub fn extract_records(body: Value) -> Result<Vec<ContentRecord>> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(LoaderError::invalid_shape(format!(
                "expected `data` to be an array, found {}",
                kind_of(&other)
            ))),
            None => Err(LoaderError::invalid_shape("response has no `data` field")),
        },
        other => Err(LoaderError::invalid_shape(format!(
            "expected an object body, found {}",
            kind_of(&other)
        ))),
    }
}

/// Borrows the `attributes` map out of a schema response.
pub fn extract_attributes(body: &Value) -> Result<&Map<String, Value>> {
    match body.get("attributes") {
        Some(Value::Object(attributes)) => Ok(attributes),
        Some(Value::Null) | None => Err(LoaderError::invalid_shape(
            "schema response has no `attributes` field",
        )),
        Some(other) => Err(LoaderError::invalid_shape(format!(
            "expected `attributes` to be an object, found {}",
            kind_of(other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// CMS client bound to one configuration; reuses a single HTTP client.
pub struct StrapiLoader<C: ConfigProvider> {
    config: C,
    gateway: FetchGateway,
}

impl<C: ConfigProvider> StrapiLoader<C> {
    pub fn new(config: C) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: C, client: Client) -> Self {
        let gateway = FetchGateway::with_client(client, config.api_url());
        Self { config, gateway }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> ContentSource for StrapiLoader<C> {
    async fn fetch_content(&self, query: &ContentQuery) -> Result<Vec<ContentRecord>> {
        let body = self
            .gateway
            .get_json(&query.collection_path(), &content_params(query))
            .await?;
        let records = extract_records(body)?;

        tracing::info!(
            "📥 Fetched {} {} records",
            records.len(),
            query.content_type
        );
        Ok(records)
    }

    async fn fetch_schema(&self, content_type: &str) -> Result<ContentSchema> {
        let body = self
            .gateway
            .get_json(&schema_path(content_type), &QueryParams::new())
            .await?;
        let schema = translate_attributes(extract_attributes(&body)?)?;

        tracing::info!("📐 Loaded schema for {} ({} fields)", content_type, schema.len());
        Ok(schema)
    }
}

/// Fetches one page of `query.content_type` records.
pub async fn fetch_content(
    query: &ContentQuery,
    config: &ServiceConfig,
) -> Result<Vec<ContentRecord>> {
    StrapiLoader::new(config.clone()).fetch_content(query).await
}

/// Fetches and translates the schema of `content_type`.
pub async fn fetch_schema(content_type: &str, api_url: &str) -> Result<ContentSchema> {
    StrapiLoader::new(ServiceConfig::new(api_url))
        .fetch_schema(content_type)
        .await
}

/// Fetches schema and records for one collection and validates every record.
///
/// Entries are keyed by `documentId` (or `id`); a record that fails the
/// schema, has no identifier, or repeats one fails the whole load.
pub async fn load_collection<S>(
    source: &S,
    name: &str,
    query: &ContentQuery,
) -> Result<LoadedCollection>
where
    S: ContentSource + ?Sized,
{
    tracing::info!("🔄 Loading collection {} ({})", name, query.content_type);

    let schema = source.fetch_schema(&query.content_type).await?;
    let records = source.fetch_content(query).await?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        schema.validate(&record)?;

        let id = record_id(&record).ok_or_else(|| LoaderError::RecordValidation {
            record: format!("#{}", index),
            issues: vec!["record has neither documentId nor id".to_string()],
        })?;
        if !seen.insert(id.clone()) {
            return Err(LoaderError::RecordValidation {
                record: id,
                issues: vec!["duplicate identifier".to_string()],
            });
        }

        entries.push(Entry { id, data: record });
    }

    tracing::info!("✅ Loaded {} entries into {}", entries.len(), name);
    Ok(LoadedCollection {
        name: name.to_string(),
        content_type: query.content_type.clone(),
        entries,
    })
}
