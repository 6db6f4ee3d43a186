//! Notifier that writes notices to the log.

use tracing::{error, info};

use crate::ports::{Notice, NoticeKind, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let duration_ms = notice.duration.as_millis() as u64;
        match notice.kind {
            NoticeKind::Success => info!(duration_ms, "{}", notice.message),
            NoticeKind::Error => {
                let code = notice.code.map(|c| c.to_string()).unwrap_or_default();
                error!(duration_ms, %code, "{}", notice.message)
            }
        }
    }
}
