mod config;
mod events;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use config::BotConfig;
use warden_core::{Data, Error};
use warden_database::{CacheService, Database, MIGRATOR};
use warden_utils::pagination::{HttpMessageEditor, PaginationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let db_pool = Database::connect(&config.database_url, config.database_max_connections).await?;
    info!(
        max_connections = config.database_max_connections,
        "PostgreSQL connection established."
    );

    let cache = build_cache(&config).await;
    let db = Database::with_cache(db_pool, cache);

    if config.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let http = Arc::new(serenity::Http::new(&config.token));
    let pagination = PaginationService::with_idle_timeout(
        Arc::new(HttpMessageEditor::new(http)),
        config.pagination_idle_timeout,
    );
    info!(
        idle_seconds = config.pagination_idle_timeout.as_secs(),
        "Pagination service ready."
    );

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("warden-bot/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let guild_id = serenity::GuildId::new(config.guild_id);
    let setup_pagination = pagination.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: warden_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(warden_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let db = db.clone();
            let pagination = setup_pagination.clone();
            let http_client = http_client.clone();
            Box::pin(async move {
                info!(user = %ready.user.name, "Warden is on watch.");
                pagination.set_current_user(ready.user.id);

                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;

                Ok(Data {
                    db,
                    pagination,
                    http_client,
                })
            })
        })
        .build();

    info!("Warden is connecting...");

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(?err, "failed to listen for ctrl-c");
            return;
        }
        info!("Shutdown requested.");
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;
    pagination.shutdown().await;
    info!("Open paginators closed.");

    result?;
    Ok(())
}

async fn build_cache(config: &BotConfig) -> CacheService {
    let prefix = config.redis_key_prefix.clone();
    if !config.redis_enabled {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return CacheService::disabled(prefix);
    }

    let Some(redis_url) = config.redis_url.as_deref() else {
        warn!(key_prefix = %prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
        return CacheService::disabled(prefix);
    };

    let cache = match CacheService::redis(redis_url, prefix.clone()) {
        Ok(cache) => {
            info!(key_prefix = %prefix, "Redis cache enabled.");
            cache
        }
        Err(err) => {
            warn!(?err, key_prefix = %prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
            return CacheService::disabled(prefix);
        }
    };

    match cache.ping().await {
        Ok(()) => info!("Redis cache health check passed."),
        Err(err) => warn!(
            ?err,
            "Redis cache ping failed; cache operations will continue with fallback behavior."
        ),
    }

    cache
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = warden_utils::embed::notice_embed(
                "Command Error",
                "Something went wrong while running this command.",
            );

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = format!(
                "Usage: `{}{}`",
                warden_utils::COMMAND_PREFIX,
                ctx.command().qualified_name
            );
            let description = match input {
                Some(input) => format!("Invalid argument: `{input}`\n{usage}"),
                None => format!("Missing required argument.\n{usage}"),
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            debug!(user = ctx.author().id.get(), "owner-only command refused");
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                error!(?err, "framework error");
            }
        }
    }
}

async fn handle_event(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            events::pagination::handle_reaction_add(data, add_reaction);
        }
        serenity::FullEvent::ReactionRemoveAll {
            removed_from_message_id,
            ..
        } => {
            events::pagination::handle_message_gone(data, *removed_from_message_id).await;
        }
        serenity::FullEvent::MessageDelete {
            deleted_message_id,
            ..
        } => {
            events::pagination::handle_message_gone(data, *deleted_message_id).await;
        }
        serenity::FullEvent::MessageDeleteBulk {
            multiple_deleted_messages_ids,
            ..
        } => {
            for message_id in multiple_deleted_messages_ids {
                events::pagination::handle_message_gone(data, *message_id).await;
            }
        }
        _ => {}
    }

    Ok(())
}
