pub mod auth;
pub mod data;
pub mod route;

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::Session;
use crate::cli::config::{api_client, auth_service, load_session, registry};
use crate::crud::{Confirm, Crud, MemoryNotifier, Notice, ViewContext};
use crate::middleware::{check_access, GuardDecision, RenderContext};
use crate::routing::{AdminPage, HistoryNavigator, NavigationKind, ResourceRoute, LOGIN_PATH};

/// Collects what a view asked for while one command runs
pub struct CliScope {
    notifier: Arc<MemoryNotifier>,
    navigator: Arc<HistoryNavigator>,
}

impl CliScope {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(MemoryNotifier::new()),
            navigator: Arc::new(HistoryNavigator::new()),
        }
    }

    pub fn ctx(&self) -> ViewContext {
        ViewContext::new(self.notifier.clone(), self.navigator.clone())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notifier.take()
    }

    pub fn navigator(&self) -> &HistoryNavigator {
        &self.navigator
    }

    /// Fails when a view bounced the user to the login page, dropping the
    /// rejected token so the next run starts anonymous.
    pub fn ensure_session(&self) -> anyhow::Result<()> {
        let bounced = self
            .navigator
            .last()
            .is_some_and(|n| n.kind == NavigationKind::Replace && n.location == LOGIN_PATH);
        if bounced {
            auth_service()?.logout()?;
            anyhow::bail!("Session rejected by the backend. Run `admin auth login <email>` again");
        }
        Ok(())
    }
}

impl Default for CliScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Session for a guarded resource command, refusing before any request when
/// there is no token.
pub fn require_session(route: &ResourceRoute) -> anyhow::Result<Session> {
    let session = load_session()?;
    let page = AdminPage::Resource(route.clone());
    if let GuardDecision::Redirect(redirect) = check_access(&session, &page, RenderContext::Client) {
        anyhow::bail!(
            "Not logged in ({} requires {}). Run `admin auth login <email>` first",
            page,
            redirect.location
        );
    }
    Ok(session)
}

pub fn crud_for(resource: &str, session: Session, scope: &CliScope) -> anyhow::Result<Crud> {
    let definition = registry()?.resolve(resource);
    Ok(Crud::new(definition, &api_client(session)?, scope.ctx()))
}

/// Asks on the terminal; anything but yes declines
pub struct PromptConfirm;

#[async_trait]
impl Confirm for PromptConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            eprint!("{} [s/N] ", prompt);
            let _ = std::io::stderr().flush();
            let mut answer = String::new();
            if std::io::stdin().read_line(&mut answer).is_err() {
                return false;
            }
            matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}
