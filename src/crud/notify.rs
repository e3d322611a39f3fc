use std::sync::Mutex;

use serde::Serialize;

pub const MSG_CREATED: &str = "Registro criado com sucesso!";
pub const MSG_UPDATED: &str = "Registro atualizado com sucesso!";
pub const MSG_DELETED: &str = "Registro removido com sucesso!";
pub const MSG_NOT_FOUND: &str = "Registro não encontrado.";
pub const MSG_DELETE_PROMPT: &str = "Deseja realmente remover este registro?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient toast-style message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Collects notices so a host can render them after the action completes
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Drains collected notices
    pub fn take(&self) -> Vec<Notice> {
        self.notices.lock().map(|mut n| std::mem::take(&mut *n)).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

/// Sends notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!("{}", notice.message),
            NoticeLevel::Success => tracing::info!("{}", notice.message),
        }
    }
}

/// "N registros encontrados"
pub fn count_label(total: u64) -> String {
    match total {
        0 => "Nenhum registro encontrado".to_string(),
        1 => "1 registro encontrado".to_string(),
        n => format!("{n} registros encontrados"),
    }
}
