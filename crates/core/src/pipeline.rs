use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    client::AnalysisClient,
    error::Result,
    history::HistoryStore,
    provider::ModelBackend,
    store::KeyValueStore,
    types::{AnalysisRequest, AnalysisResult, HistoryItem},
    validate::TypedResult,
};

/// Everything a front-end needs to show one finished analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub typed: Option<TypedResult>,
    pub item: HistoryItem,
    /// `false` when the history write failed; the result itself is still good.
    pub recorded: bool,
}

/// Analyze, validate and record one request.
///
/// Failed analyses are not recorded. A failed history write is logged and
/// reported through `recorded` instead of discarding the result.
pub async fn analyze_and_record<B, S>(
    client: &AnalysisClient<B>,
    history: &mut HistoryStore<S>,
    request: &AnalysisRequest,
    now: DateTime<Utc>,
) -> Result<AnalysisOutcome>
where
    B: ModelBackend,
    S: KeyValueStore,
{
    let result = client.analyze(request).await?;
    let typed = TypedResult::parse(request.kind, &result.text);
    let item = HistoryItem::new(request, &result, now);

    let recorded = match history.append(item.clone()) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to persist history");
            false
        }
    };

    Ok(AnalysisOutcome {
        result,
        typed,
        item,
        recorded,
    })
}
