//! `marketbook-ai`
//!
//! **Responsibility:** stall recommendations for vendors.
//!
//! - Never mutates inventory state; it reads a stall snapshot and answers.
//! - The hosted model is optional; the rule-based fallback always answers.

pub mod advisor;
pub mod context;
pub mod fallback;
pub mod result;

pub use advisor::{Advice, AdviceSource, Advisor, RecommendationAdapter};
pub use context::{StallContext, build_context, encode_context};
pub use fallback::{classify, recommend};
pub use result::{AiError, Recommendation};
