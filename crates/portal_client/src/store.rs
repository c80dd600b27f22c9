use crate::{ApiError, PortalClient};
use portal_model::{
    CheckoutSessionRequest, OrderRequest, PaymentRequest, Product, ProductQuery, StatusReply,
    StoreCategories, UserLogin,
};
use tracing::info;

impl PortalClient {
    pub async fn store_categories(&self) -> Result<StoreCategories, ApiError> {
        self.send_json(self.get("/api/store/categories")).await
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.send_json(self.get("/api/store/products").query(&query.to_pairs()))
            .await
    }

    pub async fn create_order(&self, order: &OrderRequest) -> Result<StatusReply, ApiError> {
        let reply: StatusReply = self
            .send_json(self.post("/api/store/order").json(order))
            .await?;
        info!(
            target: "client::http",
            "order {:?} for user {} ({} items)",
            reply.order_id,
            order.user_id,
            order.items.len()
        );
        Ok(reply)
    }

    pub async fn record_payment(&self, payment: &PaymentRequest) -> Result<StatusReply, ApiError> {
        self.send_json(self.post("/api/store/payment").json(payment))
            .await
    }

    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<StatusReply, ApiError> {
        self.send_json(self.post("/api/store/create_checkout_session").json(request))
            .await
    }

    /// Establishes a citizen session. Rate limited server side (429).
    pub async fn user_login(&self, login: &UserLogin) -> Result<StatusReply, ApiError> {
        self.send_json(self.post("/api/user/login").json(login))
            .await
    }

    pub async fn user_logout(&self) -> Result<(), ApiError> {
        self.send(self.post("/api/user/logout")).await?;
        Ok(())
    }
}
