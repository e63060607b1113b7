use super::{report, send_embed};
use crate::converter::{format_value, DataSize, Length, LinearUnit, Mass, Temperature, Time, Volume};
use crate::embeds::COLOR_DEFAULT;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

fn conversion_embed(title: &str, from: String, to: String) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .field("From", from, true)
        .field("To", to, true)
        .color(COLOR_DEFAULT)
}

async fn convert_linear<U: LinearUnit>(
    ctx: Context<'_>,
    title: &str,
    value: f64,
    from: U,
    to: U,
) -> Result<(), Error> {
    let result = U::convert(value, from, to);
    send_embed(
        ctx,
        conversion_embed(
            title,
            format!("{} {}", format_value(value), from.symbol()),
            format!("{} {}", format_value(result), to.symbol()),
        ),
    )
    .await
}

/// Convert currencies and units
#[poise::command(
    slash_command,
    subcommands("currency", "temperature", "length", "mass", "volume", "time", "data")
)]
pub async fn converter(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Convert between currencies at today's rate
#[poise::command(slash_command)]
pub async fn currency(
    ctx: Context<'_>,
    #[description = "Amount to convert"] amount: f64,
    #[description = "Currency code to convert from, e.g. USD"] from: String,
    #[description = "Currency code to convert to, e.g. JPY"] to: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let conversion = match ctx.data().providers.exchange.convert(amount, &from, &to).await {
        Ok(c) => c,
        Err(e) => return report(ctx, e).await,
    };

    let mut embed = conversion_embed(
        "💱 Currency",
        format!("{} {}", format_value(conversion.amount), conversion.from),
        format!("{} {}", format_value(conversion.result), conversion.to),
    )
    .field(
        "Rate",
        format!("1 {} = {} {}", conversion.from, format_value(conversion.rate), conversion.to),
        false,
    );
    if let Some(updated) = conversion.updated {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!("Rates updated {}", updated)));
    }
    send_embed(ctx, embed).await
}

/// Convert a temperature
#[poise::command(slash_command)]
pub async fn temperature(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: Temperature,
    #[description = "Unit to convert to"] to: Temperature,
) -> Result<(), Error> {
    let result = Temperature::convert(value, from, to);
    send_embed(
        ctx,
        conversion_embed(
            "🌡️ Temperature",
            format!("{}{}", format_value(value), from.symbol()),
            format!("{}{}", format_value(result), to.symbol()),
        ),
    )
    .await
}

/// Convert a length
#[poise::command(slash_command)]
pub async fn length(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: Length,
    #[description = "Unit to convert to"] to: Length,
) -> Result<(), Error> {
    convert_linear(ctx, "📏 Length", value, from, to).await
}

/// Convert a mass
#[poise::command(slash_command)]
pub async fn mass(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: Mass,
    #[description = "Unit to convert to"] to: Mass,
) -> Result<(), Error> {
    convert_linear(ctx, "⚖️ Mass", value, from, to).await
}

/// Convert a volume
#[poise::command(slash_command)]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: Volume,
    #[description = "Unit to convert to"] to: Volume,
) -> Result<(), Error> {
    convert_linear(ctx, "🧪 Volume", value, from, to).await
}

/// Convert a duration
#[poise::command(slash_command)]
pub async fn time(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: Time,
    #[description = "Unit to convert to"] to: Time,
) -> Result<(), Error> {
    convert_linear(ctx, "⏱️ Time", value, from, to).await
}

/// Convert a data size
#[poise::command(slash_command)]
pub async fn data(
    ctx: Context<'_>,
    #[description = "Value to convert"] value: f64,
    #[description = "Unit to convert from"] from: DataSize,
    #[description = "Unit to convert to"] to: DataSize,
) -> Result<(), Error> {
    convert_linear(ctx, "💾 Data size", value, from, to).await
}
