//! 结果等待策略
//!
//! 目标站点异步出结果，而且不给任何完成信号，只能等。
//! 固定等待之上再做一轮有界的"结果区域稳定"轮询：
//! 连续两次读到相同的页面文本就认为渲染结束。
//! 测试可以注入零时长策略。

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::debug;

use crate::config::Config;
use crate::infrastructure::JsExecutor;

const BODY_TEXT_JS: &str = "document.body ? document.body.textContent : ''";

/// 等待策略
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    /// 固定等待时长
    pub settle: Duration,
    /// 稳定性轮询间隔
    pub poll_interval: Duration,
    /// 最多轮询次数（0 表示只做固定等待）
    pub max_polls: usize,
}

impl WaitPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settle: Duration::from_secs(config.settle_delay_secs),
            poll_interval: Duration::from_millis(config.result_poll_interval_millis),
            max_polls: config.result_poll_max,
        }
    }

    /// 零时长策略（测试用）
    pub fn zero() -> Self {
        Self {
            settle: Duration::ZERO,
            poll_interval: Duration::ZERO,
            max_polls: 0,
        }
    }

    /// 等到结果大概率渲染完成
    pub async fn wait_for_results(&self, executor: &JsExecutor) -> Result<()> {
        debug!("等待结果渲染 ({:?})...", self.settle);
        sleep(self.settle).await;

        if self.max_polls == 0 {
            return Ok(());
        }

        let mut prev: String = executor.eval_as(BODY_TEXT_JS).await?;
        for round in 0..self.max_polls {
            sleep(self.poll_interval).await;
            let cur: String = executor.eval_as(BODY_TEXT_JS).await?;
            if cur == prev {
                debug!("结果区域在第 {} 轮轮询后稳定", round + 1);
                return Ok(());
            }
            prev = cur;
        }
        debug!("轮询 {} 轮后结果区域仍在变化，按现状提取", self.max_polls);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let policy = WaitPolicy::from_config(&config);
        assert_eq!(policy.settle, Duration::from_secs(8));
        assert_eq!(policy.poll_interval, Duration::from_millis(500));
        assert_eq!(policy.max_polls, 4);
    }

    #[test]
    fn test_zero_policy() {
        let policy = WaitPolicy::zero();
        assert_eq!(policy.settle, Duration::ZERO);
        assert_eq!(policy.max_polls, 0);
    }
}
