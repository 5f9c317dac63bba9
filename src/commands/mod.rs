use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::db::Store;
use crate::error::{ErrorKind, ProblemDetails};
use crate::handlers::{self, AddItemsInput, CastVoteInput, CreateBrandInput, CreateListInput, CreateMovieInput, RequestContext};
use crate::messages::{self, Locale};

#[derive(Debug, Parser)]
#[command(name = "you-choose", version, about = "Build item lists, vote on pairwise matchups and rank the winners")]
pub struct Cli {
    /// Id of the calling user
    #[arg(long, global = true, env = "YOU_CHOOSE_USER", default_value = "")]
    pub user: String,

    /// Run as an administrator
    #[arg(long, global = true)]
    pub admin: bool,

    /// Message locale, e.g. pt-BR
    #[arg(long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a movie
    CreateMovie {
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: i64,
        #[arg(long, default_value = "")]
        poster: String,
        #[arg(long)]
        external_id: String,
    },
    /// Register a brand
    CreateBrand {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        logo: String,
    },
    /// Create a list from at least two items of one type
    CreateList {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        cover: String,
        /// MOVIE or BRAND
        #[arg(long)]
        list_type: String,
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
    /// Add items to an existing list
    AddItems {
        #[arg(long)]
        list_id: String,
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },
    /// Pick the winner of one combination
    Vote {
        #[arg(long)]
        list_id: String,
        #[arg(long)]
        combination_id: String,
        #[arg(long)]
        winner_id: String,
    },
    /// Show a list with its ranking
    List { list_id: String },
    /// Show a list with the caller's voted and pending combinations
    ListForUser { list_id: String },
    /// Show every active list
    Lists,
    /// Rank every active item of a type
    Ranking { list_type: String },
}

impl Cli {
    pub fn context(&self, default_locale: &Locale) -> Result<RequestContext, String> {
        let locale = match &self.locale {
            Some(tag) => Locale::parse(tag)?,
            None => default_locale.clone(),
        };
        Ok(RequestContext::new(
            handlers::Actor {
                user_id: self.user.clone(),
                is_admin: self.admin,
            },
            locale,
        ))
    }
}

fn render<T: Serialize>(ctx: &RequestContext, output: T) -> Result<Value, ProblemDetails> {
    serde_json::to_value(output).map_err(|e| {
        log::error!("Failed to serialize output: {}", e);
        ProblemDetails::new(ErrorKind::Internal, messages::lookup(&ctx.locale, messages::COMMON, "Unexpected"))
    })
}

pub async fn run<S: Store + ?Sized>(store: &S, ctx: &RequestContext, command: Command) -> Result<Value, ProblemDetails> {
    info!("Running {:?} as '{}'", command, ctx.actor.user_id);

    match command {
        Command::CreateMovie {
            name,
            year,
            poster,
            external_id,
        } => {
            let input = CreateMovieInput {
                name,
                year,
                poster,
                external_id,
            };
            render(ctx, handlers::create_movie(store, ctx, input).await?)
        }
        Command::CreateBrand { name, logo } => {
            render(ctx, handlers::create_brand(store, ctx, CreateBrandInput { name, logo }).await?)
        }
        Command::CreateList {
            name,
            cover,
            list_type,
            items,
        } => {
            let input = CreateListInput {
                name,
                cover,
                list_type,
                items,
            };
            render(ctx, handlers::create_list(store, ctx, input).await?)
        }
        Command::AddItems { list_id, items } => {
            render(ctx, handlers::add_items_to_list(store, ctx, AddItemsInput { list_id, items }).await?)
        }
        Command::Vote {
            list_id,
            combination_id,
            winner_id,
        } => {
            let input = CastVoteInput {
                list_id,
                combination_id,
                winner_id,
            };
            render(ctx, handlers::cast_vote(store, ctx, input).await?)
        }
        Command::List { list_id } => render(ctx, handlers::get_list(store, ctx, &list_id).await?),
        Command::ListForUser { list_id } => render(ctx, handlers::get_list_for_user(store, ctx, &list_id).await?),
        Command::Lists => render(ctx, handlers::get_lists(store, ctx).await?),
        Command::Ranking { list_type } => render(ctx, handlers::show_ranking_items(store, ctx, &list_type).await?),
    }
}
