// Discord commands for the leveling system.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response based on the result
//
// This layer is THIN - no business logic, just translation.

use crate::core::gambling::GamblingService;
use crate::core::leveling::{
    total_xp_for_level, xp_for_next_level, DailyClaim, LevelingService, RepGrant,
};
use crate::infra::profiles::JsonProfileStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
/// This is where we store our services and configuration.
pub struct Data {
    pub leveling: Arc<LevelingService<Arc<JsonProfileStore>>>,
    pub gambling: Arc<GamblingService<Arc<JsonProfileStore>>>,
}

/// Show your rank card: level, XP progress and leaderboard position.
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target_user = user.as_ref().unwrap_or_else(|| ctx.author());
    if target_user.bot {
        ctx.say("Bots don't have ranks! 🤖").await?;
        return Ok(());
    }

    let user_id = target_user.id.get();
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let profile = ctx.data().leveling.profile(user_id, guild_id).await?;
    let rank = ctx.data().leveling.rank_of(user_id, guild_id).await?;

    let previous_threshold = total_xp_for_level(profile.level);
    let level_span = xp_for_next_level(profile.level);
    let xp_progress = profile.xp.saturating_sub(previous_threshold);
    let progress_pct = if level_span > 0 {
        xp_progress as f64 / level_span as f64
    } else {
        0.0
    };

    let rank_display = rank
        .map(|r| format!("#{}", r))
        .unwrap_or_else(|| "unranked".to_string());

    let embed = serenity::CreateEmbed::new()
        .title(format!("Rank of {}", target_user.name))
        .color(0x00ff00)
        .thumbnail(target_user.face())
        .field("Rank", rank_display, true)
        .field("Level", format!("**{}**", profile.level), true)
        .field("Total XP", format!("**{}**", profile.xp), true)
        .field(
            "Progress",
            format!(
                "{}/{} XP\n{}",
                xp_progress,
                level_span,
                build_progress_bar(progress_pct, 15)
            ),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Display a user's full profile: level, credits, reputation and activity.
#[poise::command(slash_command, guild_only)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target_user = user.as_ref().unwrap_or_else(|| ctx.author());
    if target_user.bot {
        ctx.say("Bots don't have profiles! 🤖").await?;
        return Ok(());
    }

    let user_id = target_user.id.get();
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let profile = ctx.data().leveling.profile(user_id, guild_id).await?;

    let embed = serenity::CreateEmbed::new()
        .title(format!("Profile of {}", target_user.name))
        .description(profile.description.clone())
        .color(0x00bfff)
        .thumbnail(target_user.face())
        .field("Level", format!("**{}**", profile.level), true)
        .field("Total XP", format!("**{}**", profile.xp), true)
        .field("Credits", format!("**{}** 💰", profile.credits), true)
        .field("Reputation", format!("**{}** ⭐", profile.reputation), true)
        .field("Messages", format!("{}", profile.messages_sent), true)
        .field("Voice minutes", format!("{}", profile.voice_minutes), true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Set the description shown on your profile.
#[poise::command(slash_command, guild_only, rename = "setdesc")]
pub async fn set_description(
    ctx: Context<'_>,
    #[description = "Your new profile description"] description: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    match ctx
        .data()
        .leveling
        .set_description(user_id, guild_id, description)
        .await
    {
        Ok(()) => {
            ctx.say("Profile description updated! ✏️").await?;
        }
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ {}", e))
                    .ephemeral(true),
            )
            .await?;
        }
    }
    Ok(())
}

/// Claim your daily credits.
#[poise::command(slash_command, guild_only)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    match ctx.data().leveling.claim_daily(user_id, guild_id).await? {
        DailyClaim::Granted {
            amount,
            new_balance,
        } => {
            let embed = serenity::CreateEmbed::new()
                .title("Daily credits claimed!")
                .description(format!(
                    "You received **{}** credits 💰\nNew balance: **{}**",
                    amount, new_balance
                ))
                .color(0xffd700);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        DailyClaim::OnCooldown { remaining } => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!(
                        "⏳ You already claimed today. Come back in {}.",
                        format_duration(remaining)
                    ))
                    .ephemeral(true),
            )
            .await?;
        }
    }
    Ok(())
}

/// Give another member a reputation point (once per day).
#[poise::command(slash_command, guild_only)]
pub async fn reputation(
    ctx: Context<'_>,
    #[description = "Member to give reputation to"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    if user.bot {
        ctx.say("Bots don't need reputation! 🤖").await?;
        return Ok(());
    }

    match ctx
        .data()
        .leveling
        .give_reputation(ctx.author().id.get(), user.id.get(), guild_id)
        .await
    {
        Ok(RepGrant::Granted { new_reputation }) => {
            ctx.say(format!(
                "⭐ {} gave a reputation point to {}! They now have **{}** reputation.",
                ctx.author().name,
                user.name,
                new_reputation
            ))
            .await?;
        }
        Ok(RepGrant::OnCooldown { remaining }) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!(
                        "⏳ You can give reputation again in {}.",
                        format_duration(remaining)
                    ))
                    .ephemeral(true),
            )
            .await?;
        }
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("❌ {}", e))
                    .ephemeral(true),
            )
            .await?;
        }
    }
    Ok(())
}

/// Show the XP leaderboard for this server.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[description = "Page to open"] page: Option<usize>,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    ctx.defer().await?;

    let profiles = ctx.data().leveling.leaderboard(guild_id).await?;
    if profiles.is_empty() {
        ctx.say("No one has earned XP yet! Start chatting to get on the leaderboard! 💬")
            .await?;
        return Ok(());
    }

    let per_page = 10;
    let total_pages = (profiles.len() + per_page - 1) / per_page;
    let mut current_page = page.unwrap_or(1).clamp(1, total_pages);

    let render = |current_page: usize| {
        let offset = (current_page - 1) * per_page;
        let mut description = String::new();

        let author_id = ctx.author().id.get();
        if let Some(rank) = profiles
            .iter()
            .position(|p| p.user_id == author_id)
            .map(|i| i + 1)
        {
            description.push_str(&format!("Your rank: **#{}**\n\n", rank));
        } else {
            description.push_str("You are not ranked yet.\n\n");
        }

        for (index, entry) in profiles.iter().skip(offset).take(per_page).enumerate() {
            let rank = offset + index + 1;
            let medal = match rank {
                1 => "🥇",
                2 => "🥈",
                3 => "🥉",
                _ => "  ",
            };
            let name_display = if entry.user_id == author_id {
                format!("<@{}> (You)", entry.user_id)
            } else {
                format!("<@{}>", entry.user_id)
            };
            description.push_str(&format!(
                "{} **#{}** {}\nLevel {} | {} XP\n\n",
                medal, rank, name_display, entry.level, entry.xp
            ));
        }

        let embed = serenity::CreateEmbed::new()
            .title("📊 Leaderboard")
            .description(description)
            .color(0xffd700)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {}/{}",
                current_page, total_pages
            )));

        let components = vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new("prev")
                .label("◀ Previous")
                .style(serenity::ButtonStyle::Primary)
                .disabled(current_page == 1),
            serenity::CreateButton::new("next")
                .label("Next ▶")
                .style(serenity::ButtonStyle::Primary)
                .disabled(current_page == total_pages),
        ])];

        poise::CreateReply::default().embed(embed).components(components)
    };

    let msg = ctx.send(render(current_page)).await?;
    let msg_id = msg.message().await?.id;

    // Interaction loop
    while let Some(mci) = serenity::ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(std::time::Duration::from_secs(60 * 2))
        .filter(move |mci| mci.message.id == msg_id)
        .await
    {
        match mci.data.custom_id.as_str() {
            "prev" => {
                if current_page > 1 {
                    current_page -= 1;
                }
            }
            "next" => {
                if current_page < total_pages {
                    current_page += 1;
                }
            }
            _ => {}
        }

        if let Err(e) = mci.defer(&ctx.http()).await {
            tracing::warn!("Error deferring interaction: {:?}", e);
            continue;
        }

        msg.edit(ctx, render(current_page)).await?;
    }

    // Remove components after timeout
    msg.edit(ctx, render(current_page).components(vec![])).await?;
    Ok(())
}

/// Grant XP to a member (admin only).
#[poise::command(
    slash_command,
    guild_only,
    rename = "givexp",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn give_xp(
    ctx: Context<'_>,
    #[description = "Member to grant XP to"] user: serenity::User,
    #[description = "Amount of XP"]
    #[min = 1]
    amount: u64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let (profile, level_up) = ctx
        .data()
        .leveling
        .give_xp(user.id.get(), guild_id, amount)
        .await?;

    let mut response = format!(
        "Granted **{}** XP to {}. They now have {} XP (level {}).",
        amount, user.name, profile.xp, profile.level
    );
    if let Some(event) = level_up {
        response.push_str(&format!(
            "\n🎉 That pushed them from level {} to **level {}**!",
            event.old_level, event.new_level
        ));
    }
    ctx.say(response).await?;
    Ok(())
}

/// Reset XP for one member, or for the whole server (admin only).
#[poise::command(
    slash_command,
    guild_only,
    rename = "resetlevels",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn reset_levels(
    ctx: Context<'_>,
    #[description = "Member to reset (omit to reset everyone)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    match user {
        Some(user) => {
            ctx.data()
                .leveling
                .reset_user(user.id.get(), guild_id)
                .await?;
            ctx.say(format!("Reset XP for {}.", user.name)).await?;
        }
        None => {
            let count = ctx.data().leveling.reset_guild(guild_id).await?;
            ctx.say(format!("Reset XP for **{}** members.", count))
                .await?;
        }
    }
    Ok(())
}

/// Show the XP needed for the next few levels (admin only).
#[poise::command(
    slash_command,
    guild_only,
    rename = "xplevels",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn xp_levels(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let profile = ctx.data().leveling.profile(user_id, guild_id).await?;
    let mut description = String::new();
    for level in profile.level..profile.level + 10 {
        let marker = if level == profile.level { "➡️" } else { "  " };
        description.push_str(&format!(
            "{} Level {} → {}: {} XP (total {})\n",
            marker,
            level,
            level + 1,
            xp_for_next_level(level),
            total_xp_for_level(level + 1)
        ));
    }

    let embed = serenity::CreateEmbed::new()
        .title("XP curve")
        .description(format!("```{}```", description))
        .color(0x9b59b6);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

pub(crate) fn build_progress_bar(progress: f64, length: usize) -> String {
    let clamped = progress.clamp(0.0, 1.0);
    let mut filled = (clamped * length as f64).round() as usize;
    if clamped > 0.0 && filled == 0 {
        filled = 1;
    }
    filled = filled.min(length);
    let filled_char = "▰";
    let empty_char = "▱";
    let bar = filled_char.repeat(filled) + &empty_char.repeat(length - filled);
    format!("{} ({}%)", bar, (clamped * 100.0).round() as u32)
}

pub(crate) fn format_duration(duration: chrono::Duration) -> String {
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", duration.num_seconds().max(1))
    }
}
