// Discord commands for the card games and instant wagers.
//
// Blackjack and high-low run as button-driven sessions: the command sends an
// embed with action buttons, then loops on a component collector until the
// game settles or the player goes idle. Everything else resolves in one
// reply.

use crate::core::gambling::{
    BlackjackGame, BlackjackProgress, BlackjackStart, CoinSide, GamblingError, Guess,
    GuessOutcome, HandOutcome, HighLowGame, HighLowProgress, OpeningBlackjack, Settlement,
    WheelColor,
};
use poise::serenity_prelude as serenity;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, crate::discord::commands::leveling::Data, Error>;

/// How long a card game may sit idle before it's resolved for the player.
const GAME_IDLE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum CoinSideChoice {
    Heads,
    Tails,
}

impl From<CoinSideChoice> for CoinSide {
    fn from(choice: CoinSideChoice) -> Self {
        match choice {
            CoinSideChoice::Heads => CoinSide::Heads,
            CoinSideChoice::Tails => CoinSide::Tails,
        }
    }
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum WheelColorChoice {
    #[name = "Red (40%, x2)"]
    Red,
    #[name = "Yellow (30%, x3)"]
    Yellow,
    #[name = "Green (20%, x4)"]
    Green,
    #[name = "Blue (8%, x10)"]
    Blue,
    #[name = "Purple (2%, x50)"]
    Purple,
}

impl From<WheelColorChoice> for WheelColor {
    fn from(choice: WheelColorChoice) -> Self {
        match choice {
            WheelColorChoice::Red => WheelColor::Red,
            WheelColorChoice::Yellow => WheelColor::Yellow,
            WheelColorChoice::Green => WheelColor::Green,
            WheelColorChoice::Blue => WheelColor::Blue,
            WheelColorChoice::Purple => WheelColor::Purple,
        }
    }
}

/// Check your credit balance.
#[poise::command(slash_command, guild_only)]
pub async fn balance(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let balance = ctx
        .data()
        .gambling
        .ledger()
        .balance(ctx.author().id.get(), guild_id)
        .await?;
    ctx.say(format!("💰 You have **{}** credits.", balance))
        .await?;
    Ok(())
}

/// Flip a coin, double or nothing.
#[poise::command(slash_command, guild_only)]
pub async fn coinflip(
    ctx: Context<'_>,
    #[description = "Heads or tails"] call: CoinSideChoice,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();

    let result = match ctx
        .data()
        .gambling
        .coinflip(user_id, guild_id, call.into(), bet)
        .await
    {
        Ok(result) => result,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let won = result.outcome.payout > 0;
    let embed = serenity::CreateEmbed::new()
        .title(format!("🪙 The coin landed on {}!", result.outcome.landed))
        .description(if won {
            format!(
                "You called it! You win **{}** credits.\nNew balance: **{}**",
                result.outcome.payout, result.new_balance
            )
        } else {
            format!(
                "Wrong call, you lose **{}** credits.\nNew balance: **{}**",
                bet, result.new_balance
            )
        })
        .color(if won { 0x2ecc71 } else { 0xe74c3c });
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Instant wagers: dice, lucky number and the color wheel.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("dice", "lucky_number", "color_wheel")
)]
pub async fn gamble(_ctx: Context<'_>) -> Result<(), Error> {
    // Slash invocation always routes to a subcommand.
    Ok(())
}

/// Roll two dice and call the total for odds-based payouts.
#[poise::command(slash_command, guild_only)]
pub async fn dice(
    ctx: Context<'_>,
    #[description = "The total you're calling (2-12)"]
    #[min = 2]
    #[max = 12]
    call: u32,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();

    let result = match ctx.data().gambling.dice(user_id, guild_id, call, bet).await {
        Ok(result) => result,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let won = result.outcome.payout > 0;
    let embed = serenity::CreateEmbed::new()
        .title(format!(
            "🎲 {} + {} = {}",
            result.outcome.die_one, result.outcome.die_two, result.outcome.total
        ))
        .description(if won {
            format!(
                "Dead on! You win **{}** credits.\nNew balance: **{}**",
                result.outcome.payout, result.new_balance
            )
        } else {
            format!(
                "You called {}, no dice. You lose **{}** credits.\nNew balance: **{}**",
                call, bet, result.new_balance
            )
        })
        .color(if won { 0x2ecc71 } else { 0xe74c3c });
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Pick a lucky number from 1 to 100; closer guesses pay more.
#[poise::command(slash_command, guild_only, rename = "lucky")]
pub async fn lucky_number(
    ctx: Context<'_>,
    #[description = "Your lucky number (1-100)"]
    #[min = 1]
    #[max = 100]
    call: u32,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();

    let result = match ctx
        .data()
        .gambling
        .lucky_number(user_id, guild_id, call, bet)
        .await
    {
        Ok(result) => result,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let won = result.outcome.payout > 0;
    let embed = serenity::CreateEmbed::new()
        .title(format!("🔢 The number was {}", result.outcome.drawn))
        .description(if won {
            format!(
                "You picked {} ({} away) - that's a **x{}** payout!\nYou win **{}** credits. New balance: **{}**",
                call,
                result.outcome.difference,
                result.outcome.multiplier,
                result.outcome.payout,
                result.new_balance
            )
        } else {
            format!(
                "You picked {} ({} away), too far off. You lose **{}** credits.\nNew balance: **{}**",
                call, result.outcome.difference, bet, result.new_balance
            )
        })
        .color(if won { 0x2ecc71 } else { 0xe74c3c });
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Spin the color wheel; rarer colors pay bigger multipliers.
#[poise::command(slash_command, guild_only, rename = "wheel")]
pub async fn color_wheel(
    ctx: Context<'_>,
    #[description = "The color you're betting on"] call: WheelColorChoice,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();

    let result = match ctx
        .data()
        .gambling
        .color_wheel(user_id, guild_id, call.into(), bet)
        .await
    {
        Ok(result) => result,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let won = result.outcome.payout > 0;
    let embed = serenity::CreateEmbed::new()
        .title(format!("🎡 The wheel landed on {}!", result.outcome.landed))
        .description(if won {
            format!(
                "That's your color! You win **{}** credits.\nNew balance: **{}**",
                result.outcome.payout, result.new_balance
            )
        } else {
            format!(
                "Not this time. You lose **{}** credits.\nNew balance: **{}**",
                bet, result.new_balance
            )
        })
        .color(if won { 0x2ecc71 } else { 0xe74c3c });
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show a member's gambling record since the bot last started.
#[poise::command(slash_command, guild_only, rename = "gamblingstats")]
pub async fn gambling_stats(
    ctx: Context<'_>,
    #[description = "Member to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target_user = user.as_ref().unwrap_or_else(|| ctx.author());
    let stats = ctx.data().gambling.stats_of(target_user.id.get());
    let net = stats.credits_won - stats.credits_wagered;
    let embed = serenity::CreateEmbed::new()
        .title(format!("🎰 Gambling stats for {}", target_user.name))
        .field("Games played", format!("{}", stats.games_played), true)
        .field("Games won", format!("{}", stats.games_won), true)
        .field("Credits wagered", format!("{}", stats.credits_wagered), true)
        .field("Credits won", format!("{}", stats.credits_won), true)
        .field(
            "Net",
            if net >= 0 {
                format!("+{} 📈", net)
            } else {
                format!("{} 📉", net)
            },
            true,
        )
        .color(0x9b59b6);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Explain every game and its payouts.
#[poise::command(slash_command, guild_only, rename = "gamblinghelp")]
pub async fn gambling_help(ctx: Context<'_>) -> Result<(), Error> {
    let limits = ctx.data().gambling.ledger().limits();
    let embed = serenity::CreateEmbed::new()
        .title("🎰 Games and payouts")
        .description(format!(
            "Bets must be between **{}** and **{}** credits.",
            limits.min, limits.max
        ))
        .field(
            "/coinflip",
            "Call heads or tails. A correct call pays **x2**.",
            false,
        )
        .field(
            "/gamble dice",
            "Call the total of 2d6. Exact hits pay by the odds: 2 or 12 → x36, 3 or 11 → x18, 4 or 10 → x12, 5 or 9 → x9, 6 or 8 → x7.2, 7 → x6.",
            false,
        )
        .field(
            "/gamble lucky",
            "Pick 1-100. Payout by distance from the drawn number: exact → x50, within 5 → x10, within 10 → x5, within 20 → x2.",
            false,
        )
        .field(
            "/gamble wheel",
            "Bet on a color: Red 40% → x2, Yellow 30% → x3, Green 20% → x4, Blue 8% → x10, Purple 2% → x50.",
            false,
        )
        .field(
            "/blackjack",
            "Hit, stand or double down against the dealer. Wins pay **x2**, a natural pays **x2.5**, pushes return the bet.",
            false,
        )
        .field(
            "/highlow",
            "Guess higher or lower, ties lose. Streak multipliers: 1 → x1.1, 2 → x1.25, 3 → x1.5, 4 → x2, 5 → x3, 6+ → x5. Cash out any time after one correct guess.",
            false,
        )
        .color(0x9b59b6);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

// ============================================================================
// BLACKJACK
// ============================================================================

/// Play a hand of blackjack against the dealer.
#[poise::command(slash_command, guild_only)]
pub async fn blackjack(
    ctx: Context<'_>,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();
    let gambling = ctx.data().gambling.clone();

    let game = match gambling.start_blackjack(user_id, guild_id, bet).await {
        Ok(BlackjackStart::Natural {
            game,
            outcome,
            new_balance,
        }) => {
            let (title, description) = match outcome {
                OpeningBlackjack::PlayerWins { payout } => (
                    "♠ Blackjack!".to_string(),
                    format!(
                        "A natural 21! You win **{}** credits.\nNew balance: **{}**",
                        payout, new_balance
                    ),
                ),
                OpeningBlackjack::Push { returned } => (
                    "♠ Double blackjack".to_string(),
                    format!(
                        "You and the dealer both drew naturals. Your **{}** credit bet is returned.\nNew balance: **{}**",
                        returned, new_balance
                    ),
                ),
            };
            let embed = serenity::CreateEmbed::new()
                .title(title)
                .description(description)
                .field("Your hand", render_hand_line(&game, 0), false)
                .field(
                    "Dealer's hand",
                    format!("{} ({})", game.dealer_hand(), game.dealer_hand().value()),
                    false,
                )
                .color(0x2ecc71);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
        Ok(BlackjackStart::InPlay(game)) => game,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .embed(blackjack_table_embed(&game, bet))
                .components(blackjack_buttons(&game)),
        )
        .await?;
    let msg_id = msg.message().await?.id;

    let mut settled = false;
    while let Some(mci) = serenity::ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(GAME_IDLE_TIMEOUT)
        .filter(move |mci| mci.message.id == msg_id)
        .await
    {
        let action = match mci.data.custom_id.as_str() {
            "bj_hit" => gambling.blackjack_hit(user_id).await,
            "bj_stand" => gambling.blackjack_stand(user_id).await,
            "bj_double" => gambling.blackjack_double(user_id).await,
            _ => continue,
        };

        if let Err(e) = mci.defer(&ctx.http()).await {
            tracing::warn!("Error deferring interaction: {:?}", e);
            continue;
        }

        match action {
            Ok(BlackjackProgress::InPlay(game)) => {
                msg.edit(
                    ctx,
                    poise::CreateReply::default()
                        .embed(blackjack_table_embed(&game, bet))
                        .components(blackjack_buttons(&game)),
                )
                .await?;
            }
            Ok(BlackjackProgress::Settled {
                game,
                settlement,
                new_balance,
            }) => {
                msg.edit(
                    ctx,
                    poise::CreateReply::default()
                        .embed(blackjack_result_embed(&game, &settlement, new_balance))
                        .components(vec![]),
                )
                .await?;
                settled = true;
                break;
            }
            Err(e) => {
                // Leave the table message as-is; an ephemeral note is enough.
                let _ = mci
                    .create_followup(
                        &ctx.http(),
                        serenity::CreateInteractionResponseFollowup::new()
                            .content(format!("❌ {}", e))
                            .ephemeral(true),
                    )
                    .await;
            }
        }
    }

    // Idle timeout: stand the remaining hands so the stake isn't stranded.
    if !settled {
        if let Ok(BlackjackProgress::Settled {
            game,
            settlement,
            new_balance,
        }) = gambling.blackjack_timeout(user_id).await
        {
            msg.edit(
                ctx,
                poise::CreateReply::default()
                    .embed(
                        blackjack_result_embed(&game, &settlement, new_balance)
                            .footer(serenity::CreateEmbedFooter::new(
                                "Game timed out, remaining hands stood automatically.",
                            )),
                    )
                    .components(vec![]),
            )
            .await?;
        }
    }
    Ok(())
}

fn render_hand_line(game: &BlackjackGame, index: usize) -> String {
    let hand = &game.player_hands()[index];
    let mut line = format!("{} ({})", hand, hand.value());
    if hand.doubled {
        line.push_str(" [doubled]");
    }
    line
}

fn blackjack_table_embed(game: &BlackjackGame, bet: i64) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("♠ Blackjack")
        .color(0x34495e)
        .field(
            // Hole card stays hidden until the dealer plays.
            "Dealer shows",
            format!("{} 🂠", game.dealer_hand().cards()[0]),
            false,
        );
    for index in 0..game.player_hands().len() {
        let marker = if index == game.current_hand_index() {
            "➡️ "
        } else {
            ""
        };
        embed = embed.field(
            format!("{}Your hand", marker),
            render_hand_line(game, index),
            false,
        );
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!("Bet: {} credits", bet)))
}

fn blackjack_buttons(game: &BlackjackGame) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new("bj_hit")
            .label("Hit")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new("bj_stand")
            .label("Stand")
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new("bj_double")
            .label("Double Down")
            .style(serenity::ButtonStyle::Danger)
            .disabled(game.double_down_cost().is_none()),
    ])]
}

fn blackjack_result_embed(
    game: &BlackjackGame,
    settlement: &Settlement,
    new_balance: i64,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new().title("♠ Blackjack - result");
    let mut lines = Vec::new();
    for (index, outcome) in settlement.outcomes.iter().enumerate() {
        let hand_line = render_hand_line(game, index);
        let verdict = match outcome {
            HandOutcome::Bust { lost } => format!("Bust, lost {} credits", lost),
            HandOutcome::Win { payout } => format!("Won {} credits", payout),
            HandOutcome::BlackjackWin { payout } => format!("Blackjack! Won {} credits", payout),
            HandOutcome::Push { returned } => format!("Push, {} credits returned", returned),
            HandOutcome::Lose { lost } => format!("Lost {} credits", lost),
        };
        lines.push(format!("{}\n{}", hand_line, verdict));
    }

    let won_net = settlement.total_payout > 0;
    embed = embed
        .description(lines.join("\n\n"))
        .field(
            "Dealer's hand",
            format!("{} ({})", game.dealer_hand(), settlement.dealer_value),
            false,
        )
        .field("New balance", format!("**{}**", new_balance), false)
        .color(if won_net { 0x2ecc71 } else { 0xe74c3c });
    embed
}

// ============================================================================
// HIGH-LOW
// ============================================================================

/// Guess whether the next card is higher or lower; ride the streak or cash
/// out.
#[poise::command(slash_command, guild_only, rename = "highlow")]
pub async fn high_low(
    ctx: Context<'_>,
    #[description = "Credits to bet"] bet: i64,
) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();
    let user_id = ctx.author().id.get();
    let gambling = ctx.data().gambling.clone();

    let game = match gambling.start_highlow(user_id, guild_id, bet).await {
        Ok(game) => game,
        Err(e) => return send_gambling_error(ctx, e).await,
    };

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .embed(highlow_embed(&game, None))
                .components(highlow_buttons(&game)),
        )
        .await?;
    let msg_id = msg.message().await?.id;

    let mut finished = false;
    while let Some(mci) = serenity::ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(GAME_IDLE_TIMEOUT)
        .filter(move |mci| mci.message.id == msg_id)
        .await
    {
        if let Err(e) = mci.defer(&ctx.http()).await {
            tracing::warn!("Error deferring interaction: {:?}", e);
            continue;
        }

        match mci.data.custom_id.as_str() {
            "hl_higher" | "hl_lower" => {
                let guess = if mci.data.custom_id == "hl_higher" {
                    Guess::Higher
                } else {
                    Guess::Lower
                };
                match gambling.highlow_guess(user_id, guess).await {
                    Ok(HighLowProgress::InPlay { game, outcome }) => {
                        msg.edit(
                            ctx,
                            poise::CreateReply::default()
                                .embed(highlow_embed(&game, Some(&outcome)))
                                .components(highlow_buttons(&game)),
                        )
                        .await?;
                    }
                    Ok(HighLowProgress::Lost { game, outcome }) => {
                        let drawn = match outcome {
                            GuessOutcome::Wrong { drawn } => drawn,
                            GuessOutcome::Correct { drawn, .. } => drawn,
                        };
                        let embed = serenity::CreateEmbed::new()
                            .title("🃏 High-Low - busted")
                            .description(format!(
                                "The card was **{}**. Your streak of {} and your **{}** credit stake are gone.",
                                drawn,
                                game.streak(),
                                game.total_bet()
                            ))
                            .color(0xe74c3c);
                        msg.edit(
                            ctx,
                            poise::CreateReply::default().embed(embed).components(vec![]),
                        )
                        .await?;
                        finished = true;
                        break;
                    }
                    Err(e) => {
                        let _ = mci
                            .create_followup(
                                &ctx.http(),
                                serenity::CreateInteractionResponseFollowup::new()
                                    .content(format!("❌ {}", e))
                                    .ephemeral(true),
                            )
                            .await;
                    }
                }
            }
            "hl_cashout" => match gambling.highlow_cash_out(user_id).await {
                Ok(cash_out) => {
                    let embed = serenity::CreateEmbed::new()
                        .title("🃏 High-Low - cashed out")
                        .description(format!(
                            "You walk away with **{}** credits.\nNew balance: **{}**",
                            cash_out.payout, cash_out.new_balance
                        ))
                        .color(0x2ecc71);
                    msg.edit(
                        ctx,
                        poise::CreateReply::default().embed(embed).components(vec![]),
                    )
                    .await?;
                    finished = true;
                    break;
                }
                Err(e) => {
                    let _ = mci
                        .create_followup(
                            &ctx.http(),
                            serenity::CreateInteractionResponseFollowup::new()
                                .content(format!("❌ {}", e))
                                .ephemeral(true),
                        )
                        .await;
                }
            },
            _ => {}
        }
    }

    // Idle timeout: the game is discarded and the stake forfeited.
    if !finished && gambling.highlow_timeout(user_id).await.is_ok() {
        let embed = serenity::CreateEmbed::new()
            .title("🃏 High-Low - expired")
            .description("The game sat idle too long and was discarded. The stake is forfeited.")
            .color(0x95a5a6);
        msg.edit(
            ctx,
            poise::CreateReply::default().embed(embed).components(vec![]),
        )
        .await?;
    }
    Ok(())
}

fn highlow_embed(
    game: &HighLowGame,
    last_outcome: Option<&GuessOutcome>,
) -> serenity::CreateEmbed {
    let mut description = String::new();
    if let Some(GuessOutcome::Correct { streak, .. }) = last_outcome {
        description.push_str(&format!("Correct! Streak is now **{}**.\n\n", streak));
    }
    description.push_str(&format!(
        "Current card: **{}**\nIs the next card higher or lower?",
        game.current_card()
    ));

    serenity::CreateEmbed::new()
        .title("🃏 High-Low")
        .description(description)
        .field("Streak", format!("{}", game.streak()), true)
        .field("Stake", format!("{} credits", game.total_bet()), true)
        .field(
            "Cash-out value",
            format!("{} credits", game.potential_payout()),
            true,
        )
        .color(0x3498db)
}

fn highlow_buttons(game: &HighLowGame) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new("hl_higher")
            .label("⬆ Higher")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new("hl_lower")
            .label("⬇ Lower")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new("hl_cashout")
            .label("💰 Cash Out")
            .style(serenity::ButtonStyle::Success)
            .disabled(game.streak() == 0),
    ])]
}

// ============================================================================
// SHARED
// ============================================================================

/// Bet and session errors go back as ephemeral replies so the channel isn't
/// littered with failed wagers.
async fn send_gambling_error(ctx: Context<'_>, error: GamblingError) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(format!("❌ {}", error))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
