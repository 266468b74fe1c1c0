//! Fetch → aggregate → render, shared by every page.

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::fetch::{Endpoint, HttpClient, fetch_json};

/// A rendered resource that must be released explicitly.
pub trait Dispose {
    fn dispose(self) -> Result<()>;
}

/// Fetches `endpoint`, decodes it as `T` and derives the page data from it.
///
/// `aggregate` only sees a fully decoded response.
pub async fn load<C, T, A, F>(
    client: &C,
    base_url: &str,
    endpoint: &Endpoint,
    aggregate: F,
) -> Result<A>
where
    C: HttpClient,
    T: DeserializeOwned,
    F: FnOnce(&T) -> A,
{
    let raw: T = fetch_json(client, base_url, endpoint).await?;
    Ok(aggregate(&raw))
}

/// [`load`], then `render` the derived data and return its handle.
pub async fn load_and_render<C, T, A, H, FA, FR>(
    client: &C,
    base_url: &str,
    endpoint: &Endpoint,
    aggregate: FA,
    render: FR,
) -> Result<H>
where
    C: HttpClient,
    T: DeserializeOwned,
    FA: FnOnce(&T) -> A,
    FR: FnOnce(&A) -> Result<H>,
{
    let derived = load(client, base_url, endpoint, aggregate).await?;
    render(&derived)
}

/// Owns at most one rendered handle.
///
/// The previous handle is disposed before a new one is rendered, so two
/// renders of the same page never coexist.
pub struct Panel<H: Dispose> {
    name: String,
    current: Option<H>,
}

impl<H: Dispose> Panel<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> Option<&H> {
        self.current.as_ref()
    }

    /// Disposes the current handle, then installs what `render` produces.
    ///
    /// When `render` fails the panel is left empty.
    pub fn refresh<F>(&mut self, render: F) -> Result<&H>
    where
        F: FnOnce() -> Result<H>,
    {
        self.close()?;
        let handle = render()?;
        debug!(panel = %self.name, "Panel rendered");
        Ok(self.current.insert(handle))
    }

    /// Fetches and aggregates first; the current handle is only replaced once that succeeds.
    pub async fn load_and_render<C, T, A, FA, FR>(
        &mut self,
        client: &C,
        base_url: &str,
        endpoint: &Endpoint,
        aggregate: FA,
        render: FR,
    ) -> Result<&H>
    where
        C: HttpClient,
        T: DeserializeOwned,
        FA: FnOnce(&T) -> A,
        FR: FnOnce(&A) -> Result<H>,
    {
        let derived = load(client, base_url, endpoint, aggregate).await?;
        self.refresh(|| render(&derived))
    }

    /// Disposes the current handle, if any.
    pub fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.current.take() {
            info!(panel = %self.name, "Disposing previous render");
            handle.dispose()?;
        }
        Ok(())
    }
}
