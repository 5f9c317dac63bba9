use log::info;
use serde::{Deserialize, Serialize};

use super::{CreatedOutput, RequestContext, fail, require_admin};
use crate::db::Store;
use crate::error::{EngineError, ProblemDetails};
use crate::models::{Brand, Item, ListType, Movie, Ranking};
use crate::voting::tally;

const CREATE_MOVIE: &str = "CreateMovieUseCase";
const CREATE_BRAND: &str = "CreateBrandUseCase";
const SHOWS_RANKING_ITEMS: &str = "ShowsRankingItemsUseCase";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieInput {
    pub name: String,
    pub year: i64,
    #[serde(default)]
    pub poster: String,
    pub external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBrandInput {
    pub name: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingItemsOutput {
    pub list_type: ListType,
    pub ranking: Ranking,
}

pub async fn create_movie<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    input: CreateMovieInput,
) -> Result<CreatedOutput, ProblemDetails> {
    let run = async {
        require_admin(ctx)?;

        let name = input.name.trim();
        let external_id = input.external_id.trim();
        if name.is_empty() || external_id.is_empty() || input.year <= 0 {
            return Err(EngineError::validation(
                "InvalidMovieData",
                format!("rejected movie '{}' ({}) with external id '{}'", name, input.year, external_id),
            ));
        }

        if store.item_exists(ListType::Movie, external_id).await? {
            return Err(EngineError::conflict(
                "MovieAlreadyExists",
                format!("external id '{}' is taken", external_id),
            ));
        }

        let movie = Movie::new(
            name.to_string(),
            input.year,
            input.poster.trim().to_string(),
            external_id.to_string(),
        );
        let item = Item::from(movie);
        store.create_item(&item).await?;
        Ok::<_, EngineError>(item)
    };

    let item = run.await.map_err(|e| fail(ctx, CREATE_MOVIE, e))?;
    info!("Movie '{}' created as {}", item.name(), item.id());

    Ok(CreatedOutput {
        id: item.id().to_string(),
        success_message: format!("Movie '{}' created successfully!", item.name()),
    })
}

pub async fn create_brand<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    input: CreateBrandInput,
) -> Result<CreatedOutput, ProblemDetails> {
    let run = async {
        require_admin(ctx)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("InvalidBrandData", "brand name is empty"));
        }

        if store.item_exists(ListType::Brand, name).await? {
            return Err(EngineError::conflict(
                "BrandAlreadyExists",
                format!("brand '{}' already exists", name),
            ));
        }

        let item = Item::from(Brand::new(name.to_string(), input.logo.trim().to_string()));
        store.create_item(&item).await?;
        Ok::<_, EngineError>(item)
    };

    let item = run.await.map_err(|e| fail(ctx, CREATE_BRAND, e))?;
    info!("Brand '{}' created as {}", item.name(), item.id());

    Ok(CreatedOutput {
        id: item.id().to_string(),
        success_message: format!("Brand '{}' created successfully!", item.name()),
    })
}

/// Every active item of one type, by cached win count.
pub async fn show_ranking_items<S: Store + ?Sized>(
    store: &S,
    ctx: &RequestContext,
    list_type: &str,
) -> Result<RankingItemsOutput, ProblemDetails> {
    let run = async {
        let list_type: ListType = list_type.parse()?;
        let mut items = store.list_items_active(list_type).await?;
        tally::sort_by_votes(&mut items);
        let ranking = Ranking::from_items(list_type, items)?;
        Ok::<_, EngineError>(RankingItemsOutput { list_type, ranking })
    };

    run.await.map_err(|e| fail(ctx, SHOWS_RANKING_ITEMS, e))
}
