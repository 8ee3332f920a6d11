//! Authenticated HTTP mutations as a unit of work (requires `http` feature)
mod credentials;

pub use credentials::*;

use crate::issuer::{IssueError, RequestIssuer, UserContext};
use serde_json::{json, Value};
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// A single `PUT` of a JSON body to a resource path under the base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub path: String,
    pub body: Value,
}

impl Mutation {
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            body,
        }
    }
}

/// The note/project/template update sequence, issued in that order.
pub fn notes_projects_templates(
    note_id: &str,
    project_id: &str,
    template_id: &str,
) -> Vec<Mutation> {
    vec![
        Mutation::put(
            format!("/api/notes/{note_id}"),
            json!({ "slug": "Test note | updated" }),
        ),
        Mutation::put(
            format!("/api/project/{project_id}"),
            json!({ "name": "Test project updated" }),
        ),
        Mutation::put(
            format!("/api/templates/{template_id}"),
            json!({ "name": "Test template name | updated" }),
        ),
    ]
}

/// Issues a fixed sequence of authenticated mutations per unit of work.
///
/// All virtual users share one connection pool. A unit stops at the first failed call: any
/// non-2xx status or network error is transient, while a request that cannot even be built
/// (e.g. a token that is not a valid header value) is fatal.
#[derive(Clone, Debug)]
pub struct HttpIssuer {
    client: reqwest::Client,
    credentials: Arc<Credentials>,
    mutations: Arc<[Mutation]>,
}

impl HttpIssuer {
    pub fn new(credentials: Credentials, mutations: Vec<Mutation>) -> Self {
        Self::with_client(reqwest::Client::new(), credentials, mutations)
    }

    pub fn with_client(
        client: reqwest::Client,
        credentials: Credentials,
        mutations: Vec<Mutation>,
    ) -> Self {
        Self {
            client,
            credentials: Arc::new(credentials),
            mutations: mutations.into(),
        }
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    async fn send(&self, mutation: &Mutation) -> Result<(), IssueError> {
        let url = self.credentials.url(&mutation.path).map_err(IssueError::fatal)?;

        let res = self
            .client
            .put(url)
            .bearer_auth(self.credentials.access_token())
            .json(&mutation.body)
            .send()
            .await
            .map_err(|err| {
                if err.is_builder() {
                    IssueError::fatal(err)
                } else {
                    IssueError::transient(err)
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(IssueError::transient(format!(
                "PUT {} returned {status}",
                mutation.path
            )));
        }
        // NOTE: Reading the body lets the connection go back to the pool.
        res.bytes().await.map_err(IssueError::transient)?;
        Ok(())
    }
}

impl RequestIssuer for HttpIssuer {
    async fn issue(&self, ctx: &UserContext) -> Result<(), IssueError> {
        for mutation in self.mutations.iter() {
            self.send(mutation).await?;
            trace!("User {} updated {}", ctx.id(), mutation.path);
            ctx.request_completed().await;
        }
        Ok(())
    }
}
