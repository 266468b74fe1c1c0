use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a prepared request. Implemented by [`super::BasicClient`]; tests and
/// wrappers can substitute their own.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
