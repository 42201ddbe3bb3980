//! 调用节奏控制：请求间隔与失败重试

use std::time::Duration;
use tracing::warn;

use crate::config::Config;
use crate::error::LlmError;
use crate::services::ExplanationService;

/// 在相邻两次服务调用之间插入固定间隔
///
/// 第一次调用不等待。
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    has_called: bool,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            has_called: false,
        }
    }

    /// 在发起调用前等待
    pub async fn wait(&mut self) {
        if self.has_called && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.has_called = true;
    }
}

/// 有限次数的指数退避重试
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 首次失败后的额外尝试次数
    pub max_retries: u32,
    /// 第一次重试前的等待时间，之后每次翻倍
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// 第 `retry`（从 1 开始）次重试前的等待时间
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }

    /// 调用服务，失败时按策略重试，全部失败时返回最后一次的错误
    pub async fn call(&self, service: &dyn ExplanationService, prompt: &str) -> Result<String, LlmError> {
        let mut retry = 0;
        loop {
            match service.explain(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    warn!(
                        "LLM 调用失败: {}，{:?} 后进行第 {}/{} 次重试",
                        e, delay, retry, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 前 `failures` 次调用失败，之后成功
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ExplanationService for Flaky {
        async fn explain(&self, _prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(LlmError::EmptyResponse {
                    model: "stub".to_string(),
                })
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let service = Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = policy(2).call(&service, "p").await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let service = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        assert!(policy(1).call(&service, "p").await.is_err());
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);

        let service = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        assert!(RetryPolicy::none().call(&service, "p").await.is_err());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pacer_skips_first_wait() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        let start = std::time::Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(30));
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
