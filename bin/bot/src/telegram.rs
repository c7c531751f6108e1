//! Telegram transport.
//!
//! Converts incoming text messages into service calls and renders the
//! resulting replies with Telegram reply keyboards.

use crate::service::ConversationService;
use meetup_concierge_content::ContentProvider;
use meetup_concierge_conversation::{Keyboard, Outcome, Reply, ReplyMarkup, SessionStore};
use meetup_concierge_core::ExternalUserId;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove};
use tracing::{error, info, warn};

const UNAVAILABLE: &str = "Sorry, something went wrong. Please try again later.";

/// Builds a reply keyboard from engine labels.
pub fn keyboard_markup(keyboard: &Keyboard) -> KeyboardMarkup {
    let rows = keyboard
        .rows()
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>());
    KeyboardMarkup::new(rows)
        .resize_keyboard()
        .one_time_keyboard()
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let request = bot.send_message(chat_id, reply.text);
    match reply.markup {
        ReplyMarkup::None => request.await?,
        ReplyMarkup::Keyboard(keyboard) => request.reply_markup(keyboard_markup(&keyboard)).await?,
        ReplyMarkup::RemoveKeyboard => request.reply_markup(KeyboardRemove::new()).await?,
    };
    Ok(())
}

async fn deliver(bot: &Bot, chat_id: ChatId, outcome: Outcome) -> ResponseResult<()> {
    send_reply(bot, chat_id, outcome.reply).await?;

    for notice in outcome.notices {
        if let Err(e) = bot
            .send_message(ChatId(notice.recipient.get()), notice.text)
            .await
        {
            warn!(recipient = %notice.recipient, error = %e, "Failed to notify speaker");
        }
    }
    Ok(())
}

/// Handles one incoming message.
async fn on_message<C, S>(
    bot: Bot,
    msg: Message,
    service: Arc<ConversationService<C, S>>,
) -> ResponseResult<()>
where
    C: ContentProvider + 'static,
    S: SessionStore + 'static,
{
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    let Ok(raw_id) = i64::try_from(user.id.0) else {
        warn!(user_id = user.id.0, "User id out of range");
        return Ok(());
    };
    let user_id = ExternalUserId::new(raw_id);

    match service.process(user_id, text).await {
        Ok(outcome) => deliver(&bot, msg.chat.id, outcome).await,
        Err(e) => {
            error!(%user_id, error = %e, "Failed to handle message");
            bot.send_message(msg.chat.id, UNAVAILABLE).await?;
            Ok(())
        }
    }
}

/// Polls Telegram for updates until interrupted.
pub async fn run<C, S>(bot: Bot, service: Arc<ConversationService<C, S>>)
where
    C: ContentProvider + 'static,
    S: SessionStore + 'static,
{
    info!("Polling for updates");
    Dispatcher::builder(
        bot,
        Update::filter_message().endpoint(on_message::<C, S>),
    )
    .dependencies(dptree::deps![service])
    .error_handler(LoggingErrorHandler::with_custom_text(
        "An error from the update listener",
    ))
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
    info!("Stopped polling");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_markup_keeps_rows() {
        let keyboard = Keyboard::chunked(["Track A", "Track B", "Main menu"], 2);

        let markup = keyboard_markup(&keyboard);

        let rows: Vec<Vec<String>> = markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|button| button.text.clone()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["Track A".to_string(), "Track B".to_string()],
                vec!["Main menu".to_string()],
            ]
        );
        assert!(markup.resize_keyboard);
        assert!(markup.one_time_keyboard);
    }
}
