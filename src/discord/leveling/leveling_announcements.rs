use crate::core::leveling::{total_xp_for_level, xp_for_next_level, LevelUpEvent};
use crate::discord::commands::leveling::build_progress_bar;
use poise::serenity_prelude::{self as serenity, builder::CreateMessage};
use rand::seq::SliceRandom;

/// Announce a level-up in the channel the triggering message came from and
/// grant the tier's reward role, if any. Neither step is allowed to undo the
/// XP award: failures here are logged and swallowed.
pub async fn announce_level_up(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    level_up: &LevelUpEvent,
) {
    let previous_threshold = total_xp_for_level(level_up.new_level);
    let level_span = xp_for_next_level(level_up.new_level).max(1);
    let xp_in_level = level_up
        .total_xp
        .saturating_sub(previous_threshold)
        .min(level_span);
    let progress = xp_in_level as f64 / level_span as f64;

    let mut embed = serenity::CreateEmbed::new()
        .title("Level Up!")
        .description(format!(
            "<@{}> reached level {}!",
            level_up.user_id, level_up.new_level
        ))
        .color(level_color(level_up.new_level))
        .field("Total XP", level_up.total_xp.to_string(), true)
        .field(
            "Progress",
            format!(
                "{}/{} XP\n{}",
                xp_in_level,
                level_span,
                build_progress_bar(progress, 18)
            ),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(random_flavor_line()));

    if let Some(role_id) = level_up.reward_role {
        embed = embed.field("Reward", format!("<@&{}>", role_id), true);
    }

    if let Err(e) = channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!(
            user_id = level_up.user_id,
            "Failed to send level-up embed: {e}"
        );
    }

    grant_reward_role(ctx, level_up).await;
}

/// Adding a role the member already has is a no-op on Discord's side, so
/// this can be called on every level-up without further checks.
pub async fn grant_reward_role(ctx: &serenity::Context, level_up: &LevelUpEvent) {
    let Some(role_id) = level_up.reward_role else {
        return;
    };

    let result = ctx
        .http
        .add_member_role(
            serenity::GuildId::new(level_up.guild_id),
            serenity::UserId::new(level_up.user_id),
            serenity::RoleId::new(role_id),
            Some("Level reward"),
        )
        .await;

    if let Err(e) = result {
        tracing::warn!(
            user_id = level_up.user_id,
            guild_id = level_up.guild_id,
            role_id,
            "Failed to grant level reward role: {e}"
        );
    }
}

fn level_color(level: u32) -> serenity::Colour {
    if level >= 50 {
        serenity::Colour::DARK_PURPLE
    } else if level >= 25 {
        serenity::Colour::ORANGE
    } else if level >= 10 {
        serenity::Colour::GOLD
    } else if level >= 5 {
        serenity::Colour::BLURPLE
    } else {
        serenity::Colour::LIGHT_GREY
    }
}

fn random_flavor_line() -> &'static str {
    const FLAVOR_LINES: [&str; 4] = [
        "Keep the streak going!",
        "Your grind is paying off.",
        "Another level, another flex.",
        "That XP bar never stood a chance.",
    ];

    FLAVOR_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FLAVOR_LINES[0])
}
