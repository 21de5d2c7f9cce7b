//! The scan flow: collect uploaded resumes into a batch, then run the
//! intake pipeline over the batch sequentially.

use std::sync::Arc;

use teloxide::net::Download;
use teloxide::prelude::*;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::bot::keyboards;
use crate::bot::state::{BotDialogue, HandlerResult, State};
use crate::extract::FileKind;
use crate::intake::batch::{Batch, StagedFile};
use crate::intake::notify::TelegramNotifier;
use crate::intake::pipeline::{process_resume, IntakeRequest};
use crate::state::AppState;

const SEND_RESUME_PROMPT: &str = "Отправьте резюме в формате PDF/DOCX/RTF/TXT";

/// "Сканировать резюме" menu button.
pub async fn start_scan(bot: Bot, dialogue: BotDialogue, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    bot.send_message(message.chat.id, SEND_RESUME_PROMPT).await?;
    dialogue.update(State::ReceivingResumes(Batch::default())).await?;
    Ok(())
}

/// Document message while collecting a batch (both before and after the
/// "add more?" prompt — media groups keep arriving while it is shown).
pub async fn receive_document(
    bot: Bot,
    dialogue: BotDialogue,
    mut batch: Batch,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(document) = msg.document() else {
        bot.send_message(msg.chat.id, SEND_RESUME_PROMPT).await?;
        return Ok(());
    };

    let file_name = sanitize_file_name(document.file_name.as_deref().unwrap_or("resume"));
    if let Err(e) = FileKind::from_path(std::path::Path::new(&file_name)) {
        bot.send_message(msg.chat.id, e.user_message()).await?;
        return Ok(());
    }

    // Download into the per-chat staging directory.
    let file = bot.get_file(document.file.id.clone()).await?;
    let dir = state.config.download_dir.join(msg.chat.id.to_string());
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(format!("{}_{file_name}", msg.id.0));
    let mut dst = tokio::fs::File::create(&path).await?;
    bot.download_file(&file.path, &mut dst).await?;
    dst.flush().await?;
    info!("staged '{file_name}' at {}", path.display());

    let should_prompt = batch.add(StagedFile { file_name, path }, msg.media_group_id());

    if should_prompt {
        bot.send_message(msg.chat.id, "📥 Файл сохранён.").await?;
        bot.send_message(msg.chat.id, "Хотите добавить ещё файлы?")
            .reply_markup(keyboards::add_more_files())
            .await?;
    }
    dialogue.update(State::ConfirmingAddMore(batch)).await?;
    Ok(())
}

/// "Да" — keep collecting.
pub async fn on_more_yes(
    bot: Bot,
    dialogue: BotDialogue,
    batch: Batch,
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    if let Some(message) = q.message {
        bot.send_message(message.chat.id, "📤 Отправьте ещё резюме.")
            .await?;
    }
    dialogue.update(State::ReceivingResumes(batch)).await?;
    Ok(())
}

/// "Нет" — run the pipeline over the collected batch, one file at a time.
pub async fn on_more_no(
    bot: Bot,
    dialogue: BotDialogue,
    batch: Batch,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    if batch.is_empty() {
        bot.send_message(chat_id, "⚠️ Нет файлов для обработки.").await?;
        dialogue.update(State::ReceivingResumes(Batch::default())).await?;
        return Ok(());
    }

    let recruiter_username = q
        .from
        .username
        .clone()
        .unwrap_or_else(|| q.from.id.to_string());
    let uploader_id = q.from.id.0 as i64;

    dialogue.update(State::ProcessingBatch).await?;
    bot.send_message(
        chat_id,
        format!("🤖 Найдено {} резюме. Начинаю обработку...", batch.len()),
    )
    .await?;

    let notifier = TelegramNotifier::new(bot.clone(), chat_id);
    for staged in batch.into_files() {
        let outcome = process_resume(
            &state,
            &notifier,
            IntakeRequest {
                staged: &staged,
                recruiter_username: &recruiter_username,
                uploader_id,
            },
        )
        .await;

        if let Err(e) = outcome {
            warn!("processing of '{}' failed: {e}", staged.file_name);
            bot.send_message(
                chat_id,
                format!("{} — {}", staged.file_name, e.user_message()),
            )
            .await?;
        }

        // The staged copy is removed even when processing failed.
        if let Err(e) = tokio::fs::remove_file(&staged.path).await {
            warn!("could not remove staged file {}: {e}", staged.path.display());
        }
    }

    bot.send_message(chat_id, "✅ Обработка завершена.").await?;
    dialogue.update(State::ReceivingResumes(Batch::default())).await?;
    Ok(())
}

/// Strips path separators so an uploaded name cannot escape the staging dir.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("dir\\file.docx"), "dir_file.docx");
    }
}
