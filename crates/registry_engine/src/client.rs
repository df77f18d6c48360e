use std::sync::Arc;

use console_logging::console_debug;
use futures_util::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::{form_urlencoded, Url};

use crate::types::{AvailabilityBody, MessageBody, TemplateBody};
use crate::{
    ClientSettings, ConsoleEndpoints, ConsoleError, EditTarget, FailureKind, HarvestStatusRecord,
    RegistryOperation, RegistryRecord, SetOption, UpdateStatusRecord,
};

/// Raw XML of the last executed request, as offered by the download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDownload {
    /// File name suggested by the server's `Content-Disposition` header.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Every server call the console needs. All real work happens server-side.
#[async_trait::async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn list_registries(&self) -> Result<Vec<RegistryRecord>, ConsoleError>;

    async fn list_sets(&self, provider_id: &str) -> Result<Vec<SetOption>, ConsoleError>;

    async fn list_metadata_formats(&self, provider_id: &str) -> Result<Vec<String>, ConsoleError>;

    /// Has the server issue the OAI-PMH call; returns the rendered HTML message.
    async fn execute_request(
        &self,
        base_url: &str,
        args_json: &str,
    ) -> Result<String, ConsoleError>;

    async fn download_xml(&self) -> Result<XmlDownload, ConsoleError>;

    async fn registry_operation(
        &self,
        operation: RegistryOperation,
        registry_id: &str,
    ) -> Result<(), ConsoleError>;

    async fn check_registry(&self, url: &str) -> Result<bool, ConsoleError>;

    async fn harvest_status(&self) -> Result<Vec<HarvestStatusRecord>, ConsoleError>;

    async fn update_status(&self) -> Result<Vec<UpdateStatusRecord>, ConsoleError>;

    /// Returns the rendered registry details table.
    async fn view_registry(&self, registry_id: &str) -> Result<String, ConsoleError>;

    async fn add_registry(
        &self,
        url: &str,
        harvest_rate: u64,
        harvest: bool,
    ) -> Result<(), ConsoleError>;

    /// Returns the rendered edit form of the given kind.
    async fn edit_form(&self, target: EditTarget, registry_id: &str) -> Result<String, ConsoleError>;

    async fn edit_registry(
        &self,
        registry_id: &str,
        harvest_rate: u64,
        harvest: bool,
    ) -> Result<(), ConsoleError>;

    /// Replaces the harvested metadata formats and sets with the given ids.
    async fn edit_harvest(
        &self,
        registry_id: &str,
        metadata_formats: &[String],
        sets: &[String],
    ) -> Result<(), ConsoleError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestConsoleClient {
    endpoints: ConsoleEndpoints,
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestConsoleClient {
    pub fn new(endpoints: ConsoleEndpoints, settings: ClientSettings) -> Result<Self, ConsoleError> {
        let jar = Arc::new(reqwest::cookie::Jar::default());
        if let Some(session_id) = settings.session_id.as_deref() {
            let server = endpoints.resolve("")?;
            jar.add_cookie_str(&format!("sessionid={session_id}"), &server);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .cookie_provider(jar)
            .build()
            .map_err(|err| ConsoleError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            endpoints,
            settings,
            client,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, ConsoleError> {
        let url = self.endpoints.resolve(path)?;
        self.get_url(url, query).await
    }

    async fn get_url(&self, mut url: Url, query: &[(&str, &str)]) -> Result<reqwest::Response, ConsoleError> {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        console_debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        self.ensure_success(response).await
    }

    async fn post_form(&self, target: Url, body: String) -> Result<(), ConsoleError> {
        console_debug!("POST {}", target);
        let response = self
            .client
            .post(target)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = self.ensure_success(response).await?;
        self.read_body(response).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ConsoleError> {
        let response = self.get(path, query).await?;
        self.decode_json(response).await
    }

    async fn decode_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ConsoleError> {
        let body = self.read_body(response).await?;
        serde_json::from_slice(&body)
            .map_err(|err| ConsoleError::new(FailureKind::Decode, err.to_string()))
    }

    /// Turns a non-2xx response into an error carrying the server's body text.
    async fn ensure_success(&self, response: reqwest::Response) -> Result<reqwest::Response, ConsoleError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = self
            .read_body(response)
            .await
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        Err(ConsoleError::new(
            FailureKind::HttpStatus(status.as_u16()),
            body,
        ))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ConsoleError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ConsoleError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ConsoleError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn edit_path(&self, target: EditTarget) -> &str {
        match target {
            EditTarget::Registry => &self.endpoints.edit_registry,
            EditTarget::Harvest => &self.endpoints.edit_harvest,
        }
    }

    fn operation_path(&self, operation: RegistryOperation) -> &str {
        match operation {
            RegistryOperation::Activate => &self.endpoints.activate,
            RegistryOperation::Deactivate => &self.endpoints.deactivate,
            RegistryOperation::Delete => &self.endpoints.delete,
            RegistryOperation::Harvest => &self.endpoints.harvest,
            RegistryOperation::Update => &self.endpoints.update,
        }
    }
}

#[async_trait::async_trait]
impl ConsoleApi for ReqwestConsoleClient {
    async fn list_registries(&self) -> Result<Vec<RegistryRecord>, ConsoleError> {
        self.get_json(&self.endpoints.registries, &[]).await
    }

    async fn list_sets(&self, provider_id: &str) -> Result<Vec<SetOption>, ConsoleError> {
        self.get_json(&self.endpoints.sets, &[("id", provider_id)]).await
    }

    async fn list_metadata_formats(&self, provider_id: &str) -> Result<Vec<String>, ConsoleError> {
        self.get_json(&self.endpoints.metadata_formats, &[("id", provider_id)])
            .await
    }

    async fn execute_request(
        &self,
        base_url: &str,
        args_json: &str,
    ) -> Result<String, ConsoleError> {
        let body: MessageBody = self
            .get_json(
                &self.endpoints.execute_request,
                &[("url", base_url), ("args_url", args_json)],
            )
            .await?;
        Ok(body.message)
    }

    async fn download_xml(&self) -> Result<XmlDownload, ConsoleError> {
        let response = self.get(&self.endpoints.download_xml, &[]).await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = self.read_body(response).await?;
        Ok(XmlDownload { filename, bytes })
    }

    async fn registry_operation(
        &self,
        operation: RegistryOperation,
        registry_id: &str,
    ) -> Result<(), ConsoleError> {
        let response = self
            .get(self.operation_path(operation), &[("id", registry_id)])
            .await?;
        self.read_body(response).await.map(|_| ())
    }

    async fn check_registry(&self, url: &str) -> Result<bool, ConsoleError> {
        let body: AvailabilityBody = self.get_json(&self.endpoints.check, &[("url", url)]).await?;
        Ok(body.is_available)
    }

    async fn harvest_status(&self) -> Result<Vec<HarvestStatusRecord>, ConsoleError> {
        self.get_json(&self.endpoints.check_harvest, &[]).await
    }

    async fn update_status(&self) -> Result<Vec<UpdateStatusRecord>, ConsoleError> {
        self.get_json(&self.endpoints.check_update, &[]).await
    }

    async fn view_registry(&self, registry_id: &str) -> Result<String, ConsoleError> {
        let body: TemplateBody = self
            .get_json(&self.endpoints.view, &[("id", registry_id)])
            .await?;
        Ok(body.template)
    }

    async fn add_registry(
        &self,
        url: &str,
        harvest_rate: u64,
        harvest: bool,
    ) -> Result<(), ConsoleError> {
        let target = self.endpoints.resolve(&self.endpoints.add)?;
        let body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("url", url)
                .append_pair("harvest_rate", &harvest_rate.to_string());
            // Unchecked checkboxes are simply absent from a form post.
            if harvest {
                form.append_pair("harvest", "on");
            }
            form.finish()
        };
        self.post_form(target, body).await
    }

    async fn edit_form(&self, target: EditTarget, registry_id: &str) -> Result<String, ConsoleError> {
        let url = self
            .endpoints
            .resolve_for_registry(self.edit_path(target), registry_id)?;
        let response = self.get_url(url, &[("id", registry_id)]).await?;
        let body: TemplateBody = self.decode_json(response).await?;
        Ok(body.template)
    }

    async fn edit_registry(
        &self,
        registry_id: &str,
        harvest_rate: u64,
        harvest: bool,
    ) -> Result<(), ConsoleError> {
        let target = self
            .endpoints
            .resolve_for_registry(&self.endpoints.edit_registry, registry_id)?;
        let body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("harvest_rate", &harvest_rate.to_string());
            if harvest {
                form.append_pair("harvest", "on");
            }
            form.finish()
        };
        self.post_form(target, body).await
    }

    async fn edit_harvest(
        &self,
        registry_id: &str,
        metadata_formats: &[String],
        sets: &[String],
    ) -> Result<(), ConsoleError> {
        let target = self
            .endpoints
            .resolve_for_registry(&self.endpoints.edit_harvest, registry_id)?;
        let body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.extend_pairs(metadata_formats.iter().map(|id| ("metadata_formats", id)))
                .extend_pairs(sets.iter().map(|id| ("sets", id)));
            form.finish()
        };
        self.post_form(target, body).await
    }
}

/// Extracts `filename=...` from a `Content-Disposition` header value.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches(['"', '\'']).to_string())
        .filter(|name| !name.is_empty())
}

fn map_reqwest_error(err: reqwest::Error) -> ConsoleError {
    if err.is_timeout() {
        return ConsoleError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ConsoleError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ConsoleError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::filename_from_disposition;

    #[test]
    fn disposition_filename_is_extracted() {
        assert_eq!(
            filename_from_disposition("attachment; filename=OAI_PMH_BUILD_REQ_x_.xml"),
            Some("OAI_PMH_BUILD_REQ_x_.xml".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"quoted.xml\""),
            Some("quoted.xml".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }
}
