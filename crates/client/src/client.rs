//! HTTP calls against the REST surface.

use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use stockarium_auth::{Role, User, peek_expiry};
use stockarium_core::{AlertId, ProductId};
use stockarium_inventory::{
    Alert, DashboardSummary, NewProduct, Product, ProductFilter, ProductPatch, StockMovement,
};
use stockarium_local::{KeyValueStore, SessionStore};

use crate::error::ClientError;
use crate::types::{AcknowledgedResponse, ErrorBody, LoginResponse, StockAdjustment, StockLevel, UserResponse};

/// Client bound to one API base URL and one persisted session.
///
/// No retries or backoff: each call is one request.
pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore<S>,
}

impl<S: KeyValueStore> ApiClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: SessionStore::new(store),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// User of the persisted session, if any.
    pub fn current_user(&self) -> Result<Option<User>, ClientError> {
        Ok(self.session.user()?)
    }

    /// Check connectivity by hitting the health endpoint.
    pub async fn check_connectivity(&self) -> bool {
        self.http
            .get(self.url("/health"))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    // -------------------------
    // Session
    // -------------------------

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let req = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }));
        let resp = req.send().await.map_err(network)?;
        let body: LoginResponse = read_json(resp).await?;

        self.session.set_login(&body.token, &body.user)?;
        tracing::info!(username = %body.user.username, "signed in");
        Ok(body.user)
    }

    /// Public sign-up; the server always creates an employee.
    pub async fn register(&self, username: &str, password: &str, name: &str) -> Result<User, ClientError> {
        let req = self.http.post(self.url("/api/auth/register")).json(&json!({
            "username": username,
            "password": password,
            "name": name,
        }));
        let resp = req.send().await.map_err(network)?;
        let body: UserResponse = read_json(resp).await?;
        Ok(body.user)
    }

    /// Create an account with an explicit role. Admin only.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<User, ClientError> {
        let body = json!({ "username": username, "password": password, "name": name, "role": role });
        let req = self.authed(self.http.post(self.url("/api/users")).json(&body))?;
        let body: UserResponse = self.send_json(req).await?;
        Ok(body.user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    // -------------------------
    // Products
    // -------------------------

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ClientError> {
        let mut query = vec![("search", filter.search.as_str())];
        if let Some(category) = filter.category.as_deref() {
            query.push(("category", category));
        }
        let req = self.authed(self.http.get(self.url("/api/products")).query(&query))?;
        self.send_json(req).await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        let req = self.authed(self.http.get(self.url(&format!("/api/products/{id}"))))?;
        self.send_json(req).await
    }

    pub async fn create_product(&self, data: &NewProduct) -> Result<Product, ClientError> {
        let req = self.authed(self.http.post(self.url("/api/products")).json(data))?;
        self.send_json(req).await
    }

    pub async fn update_product(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, ClientError> {
        let req = self.authed(self.http.put(self.url(&format!("/api/products/{id}"))).json(patch))?;
        self.send_json(req).await
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), ClientError> {
        let req = self.authed(self.http.delete(self.url(&format!("/api/products/{id}"))))?;
        self.send_empty(req).await
    }

    // -------------------------
    // Stock
    // -------------------------

    pub async fn get_stock(&self, id: ProductId) -> Result<StockLevel, ClientError> {
        let req = self.authed(self.http.get(self.url(&format!("/api/stock/{id}"))))?;
        self.send_json(req).await
    }

    /// Positive `change` receives stock, negative ships it.
    pub async fn adjust_stock(
        &self,
        product_id: ProductId,
        change: i64,
        reason: &str,
    ) -> Result<StockAdjustment, ClientError> {
        let body = json!({ "productId": product_id, "change": change, "reason": reason });
        let req = self.authed(self.http.post(self.url("/api/stock/adjust")).json(&body))?;
        self.send_json(req).await
    }

    pub async fn list_movements(&self, product_id: Option<ProductId>) -> Result<Vec<StockMovement>, ClientError> {
        let mut req = self.http.get(self.url("/api/movements"));
        if let Some(id) = product_id {
            req = req.query(&[("productId", id.to_string())]);
        }
        let req = self.authed(req)?;
        self.send_json(req).await
    }

    // -------------------------
    // Alerts & dashboard
    // -------------------------

    /// Unread alerts.
    pub async fn list_alerts(&self) -> Result<Vec<Alert>, ClientError> {
        let req = self.authed(self.http.get(self.url("/api/alerts")))?;
        self.send_json(req).await
    }

    pub async fn acknowledge(&self, id: AlertId) -> Result<(), ClientError> {
        let req = self.authed(self.http.post(self.url(&format!("/api/alerts/{id}/ack"))))?;
        self.send_empty(req).await
    }

    pub async fn acknowledge_all(&self) -> Result<usize, ClientError> {
        let req = self.authed(self.http.post(self.url("/api/alerts/ack-all")))?;
        let body: AcknowledgedResponse = self.send_json(req).await?;
        Ok(body.acknowledged)
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ClientError> {
        let req = self.authed(self.http.get(self.url("/api/dashboard")))?;
        self.send_json(req).await
    }

    // -------------------------
    // Plumbing
    // -------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the session token, dropping the session first if it has
    /// already expired.
    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token()?.ok_or(ClientError::NotSignedIn)?;

        let expired = match peek_expiry(&token) {
            Ok(exp) => exp <= Utc::now(),
            Err(e) => {
                tracing::warn!(error = %e, "stored token is unreadable");
                true
            }
        };
        if expired {
            self.expire_session()?;
            return Err(ClientError::SessionExpired);
        }

        Ok(req.bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = self.send(req).await?;
        read_json(resp).await
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        let resp = self.send(req).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(api_error(resp).await)
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = req.send().await.map_err(network)?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            self.expire_session()?;
            return Err(ClientError::SessionExpired);
        }
        Ok(resp)
    }

    fn expire_session(&self) -> Result<(), ClientError> {
        tracing::warn!("session rejected; signing out");
        self.session.clear()?;
        Ok(())
    }
}

fn network(e: reqwest::Error) -> ClientError {
    ClientError::Network(e.to_string())
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if !resp.status().is_success() {
        return Err(api_error(resp).await);
    }
    resp.json().await.map_err(|e| ClientError::Parse(e.to_string()))
}

async fn api_error(resp: Response) -> ClientError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
        error: String::new(),
        message: text,
    });
    ClientError::Api {
        status,
        code: body.error,
        message: body.message,
    }
}
