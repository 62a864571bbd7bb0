// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use rolodex_app::{
    ContactDraft, ContactError, ContactGateway, ContactId, ContactRecord, NewContact, UniqueField,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/contacts";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Contacts served over HTTP as a REST collection.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("gateway.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed).with_context(|| {
            format!("gateway.base_url {trimmed:?} is not a valid URL -- use http://host:port/path")
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            bail!(
                "gateway.base_url {trimmed:?} must be an http or https URL, e.g. {DEFAULT_BASE_URL}"
            );
        }
        if timeout.is_zero() {
            bail!("gateway.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn item_url(&self, id: &ContactId) -> Result<Url, ContactError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ContactError::Transport(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    fn execute(&self, what: &str, request: RequestBuilder) -> Result<Response, ContactError> {
        tracing::debug!(what, "contacts request");
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, self.timeout, &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = status_error(status, &body);
            tracing::warn!(what, status = status.as_u16(), %error, "contacts request failed");
            return Err(error);
        }
        Ok(response)
    }

    fn send<T: DeserializeOwned>(
        &self,
        what: &str,
        request: RequestBuilder,
    ) -> Result<T, ContactError> {
        self.execute(what, request)?
            .json()
            .map_err(|error| ContactError::Transport(format!("decode {what} response: {error}")))
    }
}

impl ContactGateway for HttpGateway {
    fn describe(&self) -> String {
        self.base_url.to_string()
    }

    fn list(&mut self) -> Result<Vec<ContactRecord>, ContactError> {
        self.send("list", self.http.get(self.base_url.clone()))
    }

    fn get(&mut self, id: &ContactId) -> Result<ContactRecord, ContactError> {
        let url = self.item_url(id)?;
        self.send("get", self.http.get(url))
    }

    fn create(&mut self, contact: &NewContact) -> Result<ContactRecord, ContactError> {
        self.send("create", self.http.post(self.base_url.clone()).json(contact))
    }

    fn update(
        &mut self,
        id: &ContactId,
        draft: &ContactDraft,
    ) -> Result<ContactRecord, ContactError> {
        let url = self.item_url(id)?;
        self.send("update", self.http.put(url).json(draft))
    }

    fn remove(&mut self, id: &ContactId) -> Result<(), ContactError> {
        let url = self.item_url(id)?;
        self.execute("delete", self.http.delete(url)).map(drop)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn connection_error(base_url: &Url, timeout: Duration, error: &reqwest::Error) -> ContactError {
    let reason = if error.is_timeout() {
        format!("timed out after {}ms", timeout.as_millis())
    } else {
        error.to_string()
    };
    tracing::warn!(%base_url, %reason, "contacts server unreachable");
    ContactError::Transport(format!("cannot reach {base_url}: {reason}"))
}

/// Maps a non-success response onto the error taxonomy.
fn status_error(status: StatusCode, body: &str) -> ContactError {
    let message = server_message(body);
    match status {
        StatusCode::NOT_FOUND => ContactError::NotFound,
        StatusCode::BAD_REQUEST => match message {
            Some(message) => UniqueField::from_duplicate_message(&message)
                .map_or(ContactError::Rejected(message), ContactError::DuplicateField),
            None => ContactError::Rejected("the server rejected the request".to_owned()),
        },
        _ => match message {
            Some(message) => {
                ContactError::Transport(format!("server error ({}): {message}", status.as_u16()))
            }
            None => ContactError::Transport(format!("server returned {}", status.as_u16())),
        },
    }
}

fn server_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.message
        && !message.trim().is_empty()
    {
        return Some(message);
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return Some(trimmed.to_owned());
    }
    None
}
