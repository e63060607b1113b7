use super::{notify, report, send_embed};
use crate::embeds::{self, truncate, COLOR_DEFAULT};
use crate::i18n::Message;
use crate::providers::urban::{strip_links, Definition};
use crate::utilities::{qr_code_url, random_in_range, snowflake_timestamp};
use crate::{romaji, Context, Error};
use poise::serenity_prelude as serenity;

const COLOR_URBAN: u32 = 0x1D2439;

fn definition_embed(def: &Definition) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(truncate(&def.word, 256))
        .url(&def.permalink)
        .description(truncate(&strip_links(&def.definition), 4096))
        .color(COLOR_URBAN)
        .field("👍", def.thumbs_up.to_string(), true)
        .field("👎", def.thumbs_down.to_string(), true);
    if let Some(example) = def.example.as_deref().filter(|e| !e.trim().is_empty()) {
        embed = embed.field("Example", truncate(&strip_links(example), 1024), false);
    }
    let author = def.author.as_deref().unwrap_or("anonymous");
    let footer = match def.written_on.as_deref().and_then(|w| w.get(..10)) {
        Some(date) => format!("by {} on {}", author, date),
        None => format!("by {}", author),
    };
    embed.footer(serenity::CreateEmbedFooter::new(footer))
}

/// Small everyday tools
#[poise::command(slash_command, subcommands("qrcode", "romanize", "snowflake"))]
pub async fn utilities(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Turn text into a QR code
#[poise::command(slash_command)]
pub async fn qrcode(
    ctx: Context<'_>,
    #[description = "Text or link to encode"] text: String,
    #[description = "Image size in pixels (default: 500)"]
    #[min = 100]
    #[max = 1000]
    size: Option<u32>,
) -> Result<(), Error> {
    let Some(url) = qr_code_url(&text, size.unwrap_or(500)) else {
        return notify(ctx, Message::QrTooLong).await;
    };
    let embed = serenity::CreateEmbed::new()
        .title("QR code")
        .description(format!("```\n{}\n```", truncate(&text, 1000)))
        .image(url)
        .color(COLOR_DEFAULT);
    send_embed(ctx, embed).await
}

/// Write Japanese kana in Latin letters
#[poise::command(slash_command)]
pub async fn romanize(
    ctx: Context<'_>,
    #[description = "Hiragana or katakana text"] text: String,
) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Romanization")
        .field("Input", truncate(&text, 1024), false)
        .field("Output", truncate(&romaji::romanize(&text), 1024), false)
        .color(COLOR_DEFAULT);
    send_embed(ctx, embed).await
}

/// Show when a Discord ID was created
#[poise::command(slash_command)]
pub async fn snowflake(
    ctx: Context<'_>,
    #[description = "Discord user, channel, message or server ID"] id: String,
) -> Result<(), Error> {
    let Some(created) = id.trim().parse::<u64>().ok().and_then(snowflake_timestamp) else {
        ctx.send(
            poise::CreateReply::default()
                .embed(embeds::error_embed(&format!("'{}' is not a Discord ID", id.trim())))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };
    let ts = created.timestamp();
    let embed = serenity::CreateEmbed::new()
        .title(format!("Snowflake {}", id.trim()))
        .field("Created", format!("<t:{}:F> (<t:{}:R>)", ts, ts), false)
        .field("Unix", ts.to_string(), true)
        .field("ISO 8601", created.to_rfc3339(), true)
        .color(COLOR_DEFAULT);
    send_embed(ctx, embed).await
}

/// Pick something at random
#[poise::command(slash_command, subcommands("number", "random_anime"))]
pub async fn random(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Roll a whole number between two bounds
#[poise::command(slash_command)]
pub async fn number(
    ctx: Context<'_>,
    #[description = "Lower bound (default: 1)"] min: Option<i64>,
    #[description = "Upper bound (default: 100)"] max: Option<i64>,
) -> Result<(), Error> {
    let (min, max) = (min.unwrap_or(1), max.unwrap_or(100));
    let value = random_in_range(min, max);
    ctx.say(format!("🎲 **{}** (between {} and {})", value, min.min(max), min.max(max)))
        .await?;
    Ok(())
}

/// Show a random anime from MyAnimeList
#[poise::command(slash_command, rename = "anime")]
pub async fn random_anime(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.jikan.random_anime().await {
        Ok(anime) => send_embed(ctx, embeds::mal_anime_embed(&anime)).await,
        Err(e) => report(ctx, e).await,
    }
}

/// Look a term up on Urban Dictionary
#[poise::command(slash_command)]
pub async fn urban(
    ctx: Context<'_>,
    #[description = "Word or phrase"] term: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().providers.urban.define(&term).await {
        Ok(list) => match list.first() {
            Some(def) => send_embed(ctx, definition_embed(def)).await,
            None => notify(ctx, Message::NoResults).await,
        },
        Err(e) => report(ctx, e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    #[test]
    fn test_definition_embed_strips_links() {
        let def: Definition = parse_json(
            r#"{"defid":1,"word":"yeet","definition":"to [throw] hard","example":"[yeet] it",
                "author":"someone","permalink":"https://urbanup.com/1","thumbs_up":10,
                "thumbs_down":2,"written_on":"2014-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();

        let json = serde_json::to_value(definition_embed(&def)).unwrap();
        assert_eq!(json["description"], "to throw hard");
        assert_eq!(json["footer"]["text"], "by someone on 2014-01-01");
    }
}
