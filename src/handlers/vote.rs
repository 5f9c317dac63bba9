use serde::Deserialize;

use super::{CreatedOutput, RequestContext, fail, require_user};
use crate::db::Store;
use crate::error::{EngineError, ProblemDetails};
use crate::voting::ledger;

const VOTE: &str = "VoteUseCase";

#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteInput {
    pub list_id: String,
    pub combination_id: String,
    pub winner_id: String,
}

pub async fn cast_vote<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    input: CastVoteInput,
) -> Result<CreatedOutput, ProblemDetails> {
    let run = async {
        let user_id = require_user(ctx)?;
        let vote = ledger::create_vote(
            store,
            &input.list_id,
            user_id,
            &input.combination_id,
            &input.winner_id,
        )
        .await?;
        Ok::<_, EngineError>(vote)
    };

    let vote = run.await.map_err(|e| fail(ctx, VOTE, e))?;

    Ok(CreatedOutput {
        id: vote.id,
        success_message: "Vote created successfully!".to_string(),
    })
}
