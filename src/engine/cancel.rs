// ==========================================
// 出勤登记系统 - 取消令牌
// ==========================================
// 报表请求被新请求取代时, 旧请求的结果必须丢弃
// ==========================================

use std::sync::Mutex;

/// 可克隆的取消令牌, 所有克隆共享同一状态
pub use tokio_util::sync::CancellationToken;

// ==========================================
// ReportSupersession - 报表请求取代管理
// ==========================================
/// 每次 begin() 发放新令牌并取消上一个
#[derive(Debug, Default)]
pub struct ReportSupersession {
    current: Mutex<Option<CancellationToken>>,
}

impl ReportSupersession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_begin_cancels_previous() {
        let supersession = ReportSupersession::new();
        let first = supersession.begin();
        let second = supersession.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test]
    async fn test_newer_begin_wakes_pending_request() {
        let supersession = ReportSupersession::new();
        let older = supersession.begin();
        let waiter = {
            let older = older.clone();
            tokio::spawn(async move { older.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _newer = supersession.begin();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
