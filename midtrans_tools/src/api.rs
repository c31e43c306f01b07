use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
};

use crate::{
    config::MidtransConfig,
    data_objects::{SnapErrorResponse, SnapTransaction, SnapTransactionRequest},
    MidtransApiError,
};

#[derive(Clone)]
pub struct MidtransApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl MidtransApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        // Snap uses basic auth with the server key as the username and an empty password
        let credentials = base64::encode(format!("{}:", config.server_key.reveal()));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.snap_base_url().trim_end_matches('/'))
    }

    /// Creates a Snap transaction, returning the token and redirect URL the buyer uses to pay.
    ///
    /// If the request carries no payment methods, the configured `enabled_payments` are used.
    pub async fn create_transaction(
        &self,
        mut request: SnapTransactionRequest,
    ) -> Result<SnapTransaction, MidtransApiError> {
        if request.enabled_payments.is_empty() {
            request.enabled_payments = self.config.enabled_payments.clone();
        }
        let order_id = request.transaction_details.order_id.clone();
        let url = self.url("/snap/v1/transactions");
        trace!("💳️ Creating Snap transaction for {order_id}: {url}");
        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        if status.is_success() {
            let transaction = response.json::<SnapTransaction>().await?;
            debug!("💳️ Snap transaction created for {order_id}");
            Ok(transaction)
        } else {
            let body = response.text().await?;
            let message = serde_json::from_str::<SnapErrorResponse>(&body)
                .map(|e| e.error_messages.join("; "))
                .unwrap_or(body);
            warn!("💳️ Snap rejected transaction for {order_id}. {status}: {message}");
            Err(MidtransApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
