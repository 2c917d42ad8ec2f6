//! Reply fragment production.
//!
//! The streaming handler only depends on [`ReplyProducer`]; swapping the
//! scripted implementation for a real inference backend does not touch the
//! delivery protocol.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

/// Fragments of the canned assistant reply.
const SCRIPT: &[&str] = &[
    "基于您的问题，",
    "我将从专业的角度",
    "为您提供详细的分析。",
    "首先，我们需要考虑",
    "这个问题的几个关键方面：\n\n",
    "1. 当前研究现状\n",
    "2. 主要理论框架\n",
    "3. 实践应用案例\n",
    "4. 未来发展趋势\n\n",
    "让我们先从第一点开始分析...",
];

/// Produces an ordered, finite sequence of reply fragments.
///
/// The sequence is not restartable: each call to [`produce`] starts a fresh
/// reply. Dropping the receiver cancels production.
///
/// [`produce`]: ReplyProducer::produce
pub trait ReplyProducer: Send + Sync {
    /// Start producing fragments for the given user message.
    fn produce(&self, prompt: &str) -> mpsc::Receiver<String>;
}

/// Scripted reply producer: emits a fixed script with a per-fragment delay.
#[derive(Debug, Clone)]
pub struct ScriptedReplier {
    script: Arc<Vec<String>>,
    delay: Duration,
}

impl ScriptedReplier {
    /// Create a replier over the built-in script.
    pub fn new(delay: Duration) -> Self {
        Self::with_script(SCRIPT.iter().map(|s| s.to_string()).collect(), delay)
    }

    /// Create a replier over a custom script.
    pub fn with_script(script: Vec<String>, delay: Duration) -> Self {
        Self {
            script: Arc::new(script),
            delay,
        }
    }

    /// The full reply as the client will have assembled it.
    pub fn full_text(&self) -> String {
        self.script.concat()
    }
}

impl ReplyProducer for ScriptedReplier {
    fn produce(&self, _prompt: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(8);
        let script = Arc::clone(&self.script);
        let delay = self.delay;

        tokio::spawn(async move {
            for fragment in script.iter() {
                sleep(delay).await;
                if tx.send(fragment.clone()).await.is_err() {
                    // Receiver gone: stop producing.
                    break;
                }
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fragments_in_order() {
        let replier = ScriptedReplier::with_script(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            Duration::ZERO,
        );

        let mut rx = replier.produce("hello");
        let mut got = Vec::new();
        while let Some(fragment) = rx.recv().await {
            got.push(fragment);
        }

        assert_eq!(got, vec!["a", "b", "c"]);
        assert_eq!(got.concat(), replier.full_text());
    }

    #[tokio::test]
    async fn test_default_script_is_finite_and_nonempty() {
        let replier = ScriptedReplier::new(Duration::ZERO);

        let mut rx = replier.produce("hello");
        let mut count = 0;
        let mut assembled = String::new();
        while let Some(fragment) = rx.recv().await {
            count += 1;
            assembled.push_str(&fragment);
        }

        assert_eq!(count, SCRIPT.len());
        assert_eq!(assembled, replier.full_text());
        assert!(!assembled.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_production() {
        let replier = ScriptedReplier::with_script(
            (0..100).map(|i| i.to_string()).collect(),
            Duration::from_millis(1),
        );

        let mut rx = replier.produce("hello");
        let first = rx.recv().await;
        assert!(first.is_some());
        drop(rx);
        // Producer task exits on the next send; nothing to assert beyond not
        // hanging, which the test runtime enforces.
    }
}
