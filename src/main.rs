// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (storage)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::economy::{BetLimits, CreditLedger};
use crate::core::gambling::GamblingService;
use crate::core::leveling::{LevelingConfig, LevelingService};
use crate::discord::leveling_announcements::{announce_level_up, grant_reward_role};
use crate::discord::{Data, Error};
use crate::infra::profiles::JsonProfileStore;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;

/// Event handler for non-command Discord events.
/// This is where messages earn XP and voice sessions are tracked.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            // Ignore bot messages (including our own)
            if new_message.author.bot {
                return Ok(());
            }

            // Only guild messages earn XP (not DMs)
            let Some(guild_id) = new_message.guild_id else {
                return Ok(());
            };
            let user_id = new_message.author.id.get();

            match data
                .leveling
                .process_message(user_id, guild_id.get())
                .await
            {
                Ok(Some(level_up)) => {
                    tracing::info!(
                        user_id = level_up.user_id,
                        guild_id = level_up.guild_id,
                        old_level = level_up.old_level,
                        new_level = level_up.new_level,
                        total_xp = level_up.total_xp,
                        "User leveled up"
                    );
                    announce_level_up(ctx, new_message.channel_id, &level_up).await;
                }
                Ok(None) => {
                    // XP awarded (or cooldown swallowed it) - nothing to do
                }
                Err(e) => {
                    tracing::error!("Error processing XP for message: {}", e);
                }
            }
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            if new.member.as_ref().is_some_and(|m| m.user.bot) {
                return Ok(());
            }
            let user_id = new.user_id.get();

            match (old.as_ref().and_then(|o| o.channel_id), new.channel_id) {
                // Joined voice (moving between channels keeps the session)
                (None, Some(_)) => {
                    if let Some(guild_id) = new.guild_id {
                        data.leveling.voice_joined(user_id, guild_id.get());
                    }
                }
                // Left voice entirely: flush the partial minute tally
                (Some(_), None) => match data.leveling.voice_left(user_id).await {
                    Ok(Some(level_up)) => {
                        tracing::info!(
                            user_id = level_up.user_id,
                            new_level = level_up.new_level,
                            "User leveled up from voice activity"
                        );
                        grant_reward_role(ctx, &level_up).await;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("Error flushing voice session: {}", e);
                    }
                },
                _ => {}
            }
        }
        _ => {}
    }

    Ok(())
}

/// LEVEL_REWARDS is a comma list of `level:role_id` pairs,
/// e.g. `5:111,10:222,25:333`. Malformed pairs are skipped with a warning.
fn parse_level_rewards(raw: &str) -> HashMap<u32, u64> {
    let mut rewards = HashMap::new();
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let parsed = pair
            .split_once(':')
            .and_then(|(level, role)| {
                Some((
                    level.trim().parse::<u32>().ok()?,
                    role.trim().parse::<u64>().ok()?,
                ))
            });
        match parsed {
            Some((level, role_id)) => {
                rewards.insert(level, role_id);
            }
            None => tracing::warn!("Skipping malformed LEVEL_REWARDS entry: {pair:?}"),
        }
    }
    rewards
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep runtime data in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    // One JSON-backed profile store shared by both services.
    let store = Arc::new(JsonProfileStore::new(format!("{}/profiles.json", data_dir)));

    let default_limits = BetLimits::default();
    let limits = BetLimits {
        min: env_i64("MIN_BET", default_limits.min),
        max: env_i64("MAX_BET", default_limits.max),
    };
    let ledger = CreditLedger::new(Arc::clone(&store), limits);

    let mut leveling_config = LevelingConfig::default();
    if let Ok(raw) = std::env::var("LEVEL_REWARDS") {
        leveling_config.level_rewards = parse_level_rewards(&raw);
    }
    let leveling_service = Arc::new(LevelingService::with_config(
        Arc::clone(&store),
        ledger.clone(),
        leveling_config,
    ));
    let gambling_service = Arc::new(GamblingService::new(ledger));

    // Create the data structure that will be shared across all commands
    let data = Data {
        leveling: Arc::clone(&leveling_service),
        gambling: Arc::clone(&gambling_service),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::commands::leveling::rank(),
                discord::commands::leveling::profile(),
                discord::commands::leveling::set_description(),
                discord::commands::leveling::daily(),
                discord::commands::leveling::reputation(),
                discord::commands::leveling::leaderboard(),
                discord::commands::leveling::give_xp(),
                discord::commands::leveling::reset_levels(),
                discord::commands::leveling::xp_levels(),
                discord::commands::gambling::balance(),
                discord::commands::gambling::coinflip(),
                discord::commands::gambling::gamble(),
                discord::commands::gambling::blackjack(),
                discord::commands::gambling::high_low(),
                discord::commands::gambling::gambling_stats(),
                discord::commands::gambling::gambling_help(),
            ],
            // Event handler for messages and voice state changes
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");

                // Background ticker that credits voice XP once per minute to
                // everyone sitting in a voice channel.
                let leveling = Arc::clone(&data.leveling);
                let http = ctx.http.clone();
                let cache = ctx.cache.clone();
                tokio::spawn(async move {
                    use std::time::Duration;
                    use tokio::time::sleep;

                    loop {
                        sleep(Duration::from_secs(60)).await;

                        // Drop sessions for users the cache no longer sees in
                        // voice, e.g. after a missed gateway event.
                        for user_id in leveling.tracked_voice_users() {
                            let still_in_voice = cache.guilds().iter().any(|guild_id| {
                                cache
                                    .guild(*guild_id)
                                    .map(|g| {
                                        g.voice_states
                                            .get(&serenity::UserId::new(user_id))
                                            .and_then(|vs| vs.channel_id)
                                            .is_some()
                                    })
                                    .unwrap_or(false)
                            });
                            if !still_in_voice {
                                leveling.forget_voice_session(user_id);
                            }
                        }

                        match leveling.tick_voice_xp().await {
                            Ok(level_ups) => {
                                for level_up in level_ups {
                                    tracing::info!(
                                        user_id = level_up.user_id,
                                        new_level = level_up.new_level,
                                        "User leveled up from voice activity"
                                    );
                                    if let Some(role_id) = level_up.reward_role {
                                        if let Err(e) = http
                                            .add_member_role(
                                                serenity::GuildId::new(level_up.guild_id),
                                                serenity::UserId::new(level_up.user_id),
                                                serenity::RoleId::new(role_id),
                                                Some("Level reward"),
                                            )
                                            .await
                                        {
                                            tracing::warn!(
                                                user_id = level_up.user_id,
                                                role_id,
                                                "Failed to grant level reward role: {e}"
                                            );
                                        }
                                    }
                                }
                            }
                            Err(e) => tracing::warn!("Voice XP tick failed: {}", e),
                        }
                    }
                });

                tracing::info!("Bot is ready");
                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
