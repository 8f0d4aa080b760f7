use std::sync::Arc;

use async_trait::async_trait;

use marketbook_inventory::Stall;

use crate::context::{StallContext, build_context};
use crate::fallback::recommend;
use crate::result::{AiError, Recommendation};

/// Hosted recommendation capability (e.g. an LLM behind an HTTP function).
///
/// Implementations must not mutate inventory state; they only produce text.
#[async_trait]
pub trait RecommendationAdapter: Send + Sync {
    async fn complete(&self, query: &str, context: &[StallContext]) -> Result<String, AiError>;
}

/// Where a piece of advice came from.
#[derive(Debug, Clone, PartialEq)]
pub enum AdviceSource {
    Remote,
    Offline(Recommendation),
}

/// Reply to a vendor's "where should I sell X?" question.
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub text: String,
    pub source: AdviceSource,
}

impl Advice {
    pub fn is_offline(&self) -> bool {
        matches!(self.source, AdviceSource::Offline(_))
    }
}

/// Answers recommendation questions: hosted model first, rules as fallback.
///
/// Remote failures are logged and never surfaced; the caller always gets advice.
#[derive(Clone, Default)]
pub struct Advisor {
    remote: Option<Arc<dyn RecommendationAdapter>>,
}

impl Advisor {
    pub fn new(remote: Option<Arc<dyn RecommendationAdapter>>) -> Self {
        Self { remote }
    }

    /// Advisor that only uses the rule-based fallback.
    pub fn offline() -> Self {
        Self { remote: None }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn advise(&self, query: &str, stalls: &[Stall]) -> Advice {
        if let Some(remote) = &self.remote {
            let context = build_context(stalls);
            match remote.complete(query, &context).await {
                Ok(text) if !text.trim().is_empty() => {
                    return Advice { text, source: AdviceSource::Remote };
                }
                Ok(_) => {
                    tracing::warn!("recommendation service returned an empty reply; using offline rules");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "recommendation service failed; using offline rules");
                }
            }
        }

        let recommendation = recommend(query, stalls);
        Advice {
            text: recommendation.render(),
            source: AdviceSource::Offline(recommendation),
        }
    }
}

impl core::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Advisor").field("remote", &self.remote.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use marketbook_core::{Price, StallId};
    use marketbook_inventory::Zone;

    struct Scripted {
        reply: Result<String, String>,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl RecommendationAdapter for Scripted {
        async fn complete(&self, _query: &str, context: &[StallContext]) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(context.len());
            self.reply.clone().map_err(AiError::InferenceFailed)
        }
    }

    fn stalls() -> Vec<Stall> {
        vec![
            Stall::new(StallId::new("STALL-A1").unwrap(), "A1", Zone::Food, Price::new(350.0).unwrap(), "2x2 m"),
            Stall::new(StallId::new("STALL-B1").unwrap(), "B1", Zone::Fashion, Price::new(250.0).unwrap(), "2x2 m")
                .with_tenant("Taken"),
        ]
    }

    #[tokio::test]
    async fn remote_reply_is_used_when_available() {
        let remote = Arc::new(Scripted { reply: Ok("Take A1!".into()), seen: Mutex::new(vec![]) });
        let advisor = Advisor::new(Some(remote.clone()));
        let advice = advisor.advise("noodles", &stalls()).await;
        assert_eq!(advice.text, "Take A1!");
        assert_eq!(advice.source, AdviceSource::Remote);
        // only the available stall is sent as context
        assert_eq!(*remote.seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_rules() {
        let remote = Arc::new(Scripted { reply: Err("503".into()), seen: Mutex::new(vec![]) });
        let advisor = Advisor::new(Some(remote));
        let advice = advisor.advise("food", &stalls()).await;
        assert!(advice.is_offline());
        assert!(advice.text.contains("A1"));
    }

    #[tokio::test]
    async fn blank_remote_reply_falls_back_to_rules() {
        let remote = Arc::new(Scripted { reply: Ok("   ".into()), seen: Mutex::new(vec![]) });
        let advice = Advisor::new(Some(remote)).advise("food", &stalls()).await;
        assert!(advice.is_offline());
    }

    #[tokio::test]
    async fn offline_advisor_never_calls_out() {
        let advice = Advisor::offline().advise("clothes", &stalls()).await;
        match advice.source {
            AdviceSource::Offline(rec) => assert!(rec.is_degraded()),
            AdviceSource::Remote => panic!("offline advisor must not use a remote"),
        }
    }
}
