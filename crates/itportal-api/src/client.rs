// Async HTTP client for the ITPortal REST API v2.0.
//
// Base path: /api/2.0/
// Auth: raw API key in the Authorization header

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::filters::ListFilters;
use crate::kind::{Entity, EntityKind};
use crate::models::{ItemEnvelope, ListEnvelope, Page};
use crate::transport::TransportConfig;

/// Items requested per page by [`ItPortalClient::list_all`].
pub const PAGE_SIZE: usize = 100;

const DEFAULT_UPLOAD_TYPE: &str = "application/octet-stream";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the ITPortal API.
///
/// Stateless apart from the connection pool; cheap to share behind an `Arc`.
/// No request is ever retried.
#[derive(Debug, Clone)]
pub struct ItPortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ItPortalClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    pub fn new(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL path ends with exactly one `/` so relative joins
    /// keep any prefix (e.g. `https://host/portal/`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Send a prepared request and return the body of a 2xx response.
    async fn execute(
        &self,
        method: &Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, Error> {
        let transport_err = |source: reqwest::Error| Error::Transport {
            method: method.to_string(),
            path: path.to_owned(),
            source,
        };

        let resp = request.send().await.map_err(transport_err)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport_err)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(parse_error(method, path, status, &body))
        }
    }

    async fn get_raw(&self, path: &str, query: &[(String, String)]) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={query:?}");

        let request = self.http.get(url).query(query);
        self.execute(&Method::GET, path, request).await
    }

    pub(crate) async fn send_json<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let request = self.http.request(method.clone(), url).json(body);
        self.execute(&method, path, request).await
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Fetch one page from an arbitrary list endpoint.
    ///
    /// `limit` and `offset` are only sent when non-zero.
    pub async fn list_page_at<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &ListFilters,
        limit: usize,
        offset: usize,
    ) -> Result<Page<T>, Error> {
        let mut query = filters.to_query();
        if limit > 0 {
            query.push(("limit".to_owned(), limit.to_string()));
        }
        if offset > 0 {
            query.push(("offset".to_owned(), offset.to_string()));
        }

        let body = self.get_raw(path, &query).await?;
        let envelope: ListEnvelope<T> = decode(path, body)?;
        Ok(Page {
            items: envelope.data.results,
            total: envelope.data.total,
            offset: envelope.data.offset,
            limit: envelope.data.limit,
        })
    }

    /// Fetch up to `max_items` records from an arbitrary list endpoint.
    ///
    /// Each request asks for at most [`PAGE_SIZE`] items and never more
    /// than the remaining budget, so the result holds `min(total, max_items)`
    /// records. Stops early on an empty page.
    pub async fn list_all_at<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &ListFilters,
        max_items: usize,
    ) -> Result<Vec<T>, Error> {
        let mut all: Vec<T> = Vec::new();
        let mut offset = 0;

        while all.len() < max_items {
            let want = PAGE_SIZE.min(max_items - all.len());
            let page = self.list_page_at::<T>(path, filters, want, offset).await?;
            let received = page.items.len();
            all.extend(page.items);
            offset += received;

            if received == 0 || offset >= page.total {
                break;
            }
        }

        all.truncate(max_items);
        Ok(all)
    }

    /// Fetch one page of `T`'s collection.
    pub async fn list_page<T: Entity>(
        &self,
        filters: &ListFilters,
        limit: usize,
        offset: usize,
    ) -> Result<Page<T>, Error> {
        self.list_page_at(&T::KIND.collection_path(), filters, limit, offset)
            .await
    }

    /// Fetch up to `max_items` records of `T`'s collection.
    pub async fn list_all<T: Entity>(
        &self,
        filters: &ListFilters,
        max_items: usize,
    ) -> Result<Vec<T>, Error> {
        self.list_all_at(&T::KIND.collection_path(), filters, max_items)
            .await
    }

    // ── Single records ───────────────────────────────────────────────

    /// Fetch one record by ID.
    ///
    /// The portal answers item paths with a list envelope; an empty result
    /// set becomes [`Error::NotFound`].
    pub async fn get_one<T: Entity>(&self, id: i64) -> Result<T, Error> {
        let path = T::KIND.item_path(id);
        let page = self
            .list_page_at::<T>(&path, &ListFilters::default(), 0, 0)
            .await?;
        page.items
            .into_iter()
            .next()
            .ok_or(Error::NotFound { path })
    }

    /// POST a new record to `T`'s collection and return what the portal stored.
    pub async fn create<T: Entity, B: Serialize + Sync + ?Sized>(
        &self,
        payload: &B,
    ) -> Result<T, Error> {
        self.create_at(&T::KIND.collection_path(), payload).await
    }

    pub(crate) async fn create_at<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, Error> {
        let body = self.send_json(Method::POST, path, payload).await?;
        let envelope: ItemEnvelope<T> = decode(path, body)?;
        Ok(envelope.data)
    }

    /// PATCH only the supplied fields of one record.
    pub async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), Error> {
        self.send_json(Method::PATCH, &kind.item_path(id), fields)
            .await
            .map(drop)
    }

    pub async fn delete(&self, kind: EntityKind, id: i64) -> Result<(), Error> {
        let path = kind.item_path(id);
        let url = self.url(&path)?;
        debug!("DELETE {url}");

        let request = self.http.delete(url);
        self.execute(&Method::DELETE, &path, request)
            .await
            .map(drop)
    }

    // ── Uploads ──────────────────────────────────────────────────────

    /// POST raw file bytes as `multipart/form-data` with a single `file` part.
    ///
    /// An empty `content_type` is sent as `application/octet-stream`.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<(), Error> {
        let mime = if content_type.is_empty() {
            DEFAULT_UPLOAD_TYPE
        } else {
            content_type
        };
        let part = Part::bytes(data)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .map_err(|e| Error::InvalidRequest {
                message: format!("invalid content type {mime:?}: {e}"),
            })?;
        let form = Form::new().part("file", part);

        let url = self.url(path)?;
        debug!("POST {url} (multipart, file={file_name})");

        let request = self.http.post(url).multipart(form);
        self.execute(&Method::POST, path, request).await.map(drop)
    }
}

// ── Response helpers ─────────────────────────────────────────────────

fn decode<T: DeserializeOwned>(path: &str, body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            path: path.to_owned(),
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

fn parse_error(method: &Method, path: &str, status: reqwest::StatusCode, body: &str) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Error::Authentication {
            message: format!("{method} {path} -> {}", status.as_u16()),
        };
    }

    let trimmed = body.trim();
    Error::Remote {
        method: method.to_string(),
        path: path.to_owned(),
        status: status.as_u16(),
        message: if trimmed.is_empty() {
            status.to_string()
        } else {
            trimmed.to_owned()
        },
    }
}
