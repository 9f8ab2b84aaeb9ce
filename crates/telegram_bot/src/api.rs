use api_types::{
    category::CategoryView,
    cost_center::CostCenterView,
    entry::{EntryListResponse, EntryNew, EntryView},
    error::ErrorBody,
};
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::store::{LedgerStore, StoreError};

/// HTTP client for the ledger API. Authentication is carried by the default
/// headers of `client`.
#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub(crate) fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send_json<TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        req: RequestBuilder,
    ) -> Result<TResp, StoreError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<TResp>().await?);
        }

        let body = resp.json::<ErrorBody>().await.ok();
        match body {
            Some(body) if status == StatusCode::UNPROCESSABLE_ENTITY && !body.fields.is_empty() => {
                Err(StoreError::Invalid(body.fields))
            }
            Some(body) => Err(StoreError::Server {
                status,
                message: body.error,
            }),
            None => Err(StoreError::Server {
                status,
                message: "server error".to_string(),
            }),
        }
    }

    async fn get_json<TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<TResp, StoreError> {
        self.send_json(self.client.get(self.url(path)).query(query))
            .await
    }

    async fn post_json<TReq: serde::Serialize + ?Sized, TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, StoreError> {
        self.send_json(self.client.post(self.url(path)).json(body))
            .await
    }
}

impl LedgerStore for ApiClient {
    async fn list_categories(&self) -> Result<Vec<CategoryView>, StoreError> {
        self.get_json("/categories", &[]).await
    }

    async fn list_cost_centers(&self) -> Result<Vec<CostCenterView>, StoreError> {
        self.get_json("/cost-centers", &[]).await
    }

    async fn create_entry(&self, entry: &EntryNew) -> Result<EntryView, StoreError> {
        self.post_json("/entries", entry).await
    }

    async fn list_recent_entries(&self, limit: u64) -> Result<Vec<EntryView>, StoreError> {
        let response: EntryListResponse = self
            .get_json("/entries/recent", &[("limit", limit.to_string())])
            .await?;
        Ok(response.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let api = ApiClient::new(Client::new(), "http://127.0.0.1:3000/".to_string());
        assert_eq!(api.url("/entries"), "http://127.0.0.1:3000/entries");
        assert_eq!(api.url("categories"), "http://127.0.0.1:3000/categories");
    }
}
