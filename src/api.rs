// snipsync/src/api.rs
//! Remote listing fetch. The API is Bitbucket-shaped: a paginated
//! `values` array with a nested owner and a list of clone links.
//!
//! Any transport or decode failure is fatal for the caller; a partial
//! listing must never become a snapshot.

use anyhow::{
    anyhow,
    Context,
    Result,
};
use serde::Deserialize;
use crate::{
    config::Config,
    metadata::SnippetMetadata,
};

pub const DEFAULT_API_BASE: &str = "https://api.bitbucket.org/2.0/snippets";

pub struct RemoteApi {
    base_url: String,
    username: String,
    app_password: String,
    client: reqwest::blocking::Client,
}

impl RemoteApi {
    pub fn new(config: &Config) -> RemoteApi {
        RemoteApi {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            app_password: config.app_password.clone(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Fetch the user's full snippet listing, following pagination.
    pub fn fetch_all(&self) -> Result<Vec<SnippetMetadata>> {
        let mut url = format!("{}/{}", self.base_url, self.username);
        let mut all = Vec::new();

        loop {
            let page: Page = self
                .client
                .get(&url)
                .basic_auth(&self.username, Some(&self.app_password))
                .send()
                .with_context(|| format!("requesting {url}"))?
                .error_for_status()
                .context("remote listing request rejected")?
                .json()
                .context("decoding remote listing")?;

            for wire in page.values {
                all.push(wire.into_metadata()?);
            }
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(all)
    }
}

/* ------------------------------- wire shape ------------------------------- */

#[derive(Deserialize)]
struct Page {
    values: Vec<WireSnippet>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct WireSnippet {
    id: String,
    #[serde(default)]
    title: String,
    owner: WireOwner,
    links: WireLinks,
}

#[derive(Deserialize)]
struct WireOwner {
    username: String,
}

#[derive(Deserialize)]
struct WireLinks {
    #[serde(default)]
    clone: Vec<WireCloneLink>,
}

#[derive(Deserialize)]
struct WireCloneLink {
    name: String,
    href: String,
}

impl WireSnippet {
    /// Flatten to the metadata the engine consumes; the ssh clone link
    /// wins, https is the fallback.
    fn into_metadata(self) -> Result<SnippetMetadata> {
        let clone_url = pick_clone_link(&self.links.clone)
            .ok_or_else(|| anyhow!("snippet {} has no clone link", self.id))?;
        Ok(SnippetMetadata {
            id: self.id,
            title: self.title,
            owner: self.owner.username,
            clone_url,
        })
    }
}

fn pick_clone_link(links: &[WireCloneLink]) -> Option<String> {
    links
        .iter()
        .find(|l| l.name == "ssh")
        .or_else(|| links.iter().find(|l| l.name == "https"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

/* ===================================== Tests ===================================== */
