use std::time::Duration;

/// 指数退避重试策略
///
/// 第 1 次尝试立即执行；第 n 次（n >= 2）之前等待
/// `base_delay * 2^(n-2)`。达到 `max_attempts` 后任务转入终态失败。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// 第 attempt 次尝试前的延迟
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2);
        self.base_delay * 2u32.saturating_pow(exponent)
    }

    pub fn is_exhausted(&self, attempt_count: u32) -> bool {
        attempt_count >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            max_attempts: 5,
        }
    }
}
