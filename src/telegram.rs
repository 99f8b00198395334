//! Telegram transport
//!
//! Converts updates into controller events and keyboards into inline markup.
//! All conversation logic lives in the controller.

use crate::backend::{HttpBackend, LoggingBackend};
use crate::keyboards::{self, Keyboard};
use crate::runtime::{Controller, Incoming, Messenger};
use crate::state_machine::{Event, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::payloads::{
    AnswerCallbackQuerySetters, EditMessageReplyMarkupSetters, SendMessageSetters,
};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::update_listeners::Polling;
use tokio_util::sync::CancellationToken;

pub type BotController = Controller<LoggingBackend<HttpBackend>, TelegramMessenger>;

/// Outbound messages through the Bot API
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), String> {
        let request = self.bot.send_message(ChatId(chat_id), text);
        let result = match keyboard {
            Some(keyboard) => request.reply_markup(inline_markup(keyboard)).await,
            None => request.await,
        };
        result.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn edit_keyboard(
        &self,
        chat_id: i64,
        message_id: i32,
        keyboard: &Keyboard,
    ) -> Result<(), String> {
        self.bot
            .edit_message_reply_markup(ChatId(chat_id), MessageId(message_id))
            .reply_markup(inline_markup(keyboard))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

// ============================================================================
// Update handlers
// ============================================================================

fn schema() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

async fn on_message(msg: Message, controller: Arc<BotController>) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        tracing::debug!(chat_id = msg.chat.id.0, "Ignoring message without sender or text");
        return Ok(());
    };

    controller
        .handle(Incoming::text(UserId(user.id.0), msg.chat.id.0, text))
        .await;
    Ok(())
}

/// Events whose handling waits on the backend. Their button is answered
/// up front, before Telegram's callback deadline passes.
fn answers_before_handling(event: &Event) -> bool {
    matches!(event, Event::Go)
}

async fn answer_callback(bot: &Bot, q: &CallbackQuery, toast: Option<String>) {
    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(toast) = toast {
        answer = answer.text(toast);
    }
    if let Err(e) = answer.await {
        tracing::warn!(user_id = q.from.id.0, error = %e, "Failed to answer callback");
    }
}

async fn on_callback(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<BotController>,
) -> ResponseResult<()> {
    let data = q.data.as_deref().unwrap_or_default();
    let Some(event) = keyboards::parse_callback(data) else {
        tracing::debug!(user_id = q.from.id.0, data, "Ignoring unknown callback");
        answer_callback(&bot, &q, None).await;
        return Ok(());
    };

    let answered = answers_before_handling(&event);
    if answered {
        answer_callback(&bot, &q, None).await;
    }

    let (chat_id, message_id) = match q.regular_message() {
        Some(message) => (message.chat.id, Some(message.id.0)),
        None => (ChatId::from(q.from.id), None),
    };
    let outcome = controller
        .handle(Incoming::button(UserId(q.from.id.0), chat_id.0, message_id, event))
        .await;
    tracing::debug!(user_id = q.from.id.0, step = %outcome.step, "Callback handled");

    // Reactions are answered late so the toast can name the verdict
    if !answered {
        answer_callback(&bot, &q, outcome.toast).await;
    }
    Ok(())
}

/// Long-poll Telegram until `shutdown` is cancelled
pub async fn run(bot: Bot, controller: Arc<BotController>, shutdown: CancellationToken) {
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![controller])
        .default_handler(|update| async move {
            tracing::debug!(update_id = ?update.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => tracing::debug!(error = %e, "Dispatcher was not running"),
        }
    });

    let listener = Polling::builder(bot).drop_pending_updates().build();
    tracing::info!("Telegram polling started");
    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
    tracing::info!("Telegram polling stopped");
}
