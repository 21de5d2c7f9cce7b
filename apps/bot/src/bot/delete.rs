//! The delete flow: id → explicit confirmation → remove from every worksheet.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use crate::bot::keyboards;
use crate::bot::state::{BotDialogue, HandlerResult, State};
use crate::sheets::store::delete_resume_everywhere;
use crate::state::AppState;

/// "Удалить запись" menu button.
pub async fn start_delete(bot: Bot, dialogue: BotDialogue, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    bot.send_message(message.chat.id, "🗑️ Введите ID записи для удаления:")
        .await?;
    dialogue.update(State::AwaitingDeleteId).await?;
    Ok(())
}

/// The typed-in id: ask for confirmation before touching the spreadsheet.
pub async fn receive_delete_id(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    let Some(resume_id) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        bot.send_message(msg.chat.id, "Введите ID записи текстом.").await?;
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        format!(
            "⚠️ Вы уверены, что хотите удалить запись с ID: {resume_id}?\n\n\
             Это действие удалит все данные кандидата из всех листов таблицы \
             и не может быть отменено!"
        ),
    )
    .reply_markup(keyboards::confirm_delete(resume_id))
    .await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

/// "Да, удалить" — the id travels in the callback data.
pub async fn on_confirm_delete(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;

    let resume_id = q
        .data
        .as_deref()
        .and_then(|d| d.strip_prefix(keyboards::CONFIRM_DELETE_PREFIX))
        .unwrap_or_default()
        .to_string();

    bot.send_message(message.chat.id, format!("🗑️ Удаляю запись с ID: {resume_id}..."))
        .await?;

    let reply = match delete_resume_everywhere(&state.sheets, &resume_id).await {
        Ok(deleted) if deleted > 0 => {
            info!("deleted {deleted} row(s) for {resume_id}");
            format!("✅ Запись с ID {resume_id} успешно удалена из всех листов таблицы!")
        }
        Ok(_) => format!("⚠️ Записи с ID {resume_id} не найдены."),
        Err(e) => {
            tracing::error!("delete of {resume_id} failed: {e}");
            format!("❌ Не удалось удалить запись с ID {resume_id}. Проверьте подключение к таблице.")
        }
    };
    bot.send_message(message.chat.id, reply)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

/// "Отмена" — back to the main menu.
pub async fn on_cancel_delete(bot: Bot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    bot.send_message(message.chat.id, "❌ Удаление отменено")
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}
