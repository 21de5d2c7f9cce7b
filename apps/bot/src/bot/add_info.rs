//! The add-info flow: manual corrections of a stored candidate record.
//!
//! Every branch writes twice: into the facet worksheet (columns addressed by
//! header name) and into the matching summary-worksheet column.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::error;

use crate::bot::keyboards;
use crate::bot::state::{
    BotDialogue, HandlerResult, InfoTarget, LocationDraft, NameDraft, PairDraft, PairValueDraft,
    State,
};
use crate::intake::pipeline::compute_rates;
use crate::profile::Currency;
use crate::sheets::rows::{client_rate_updates, join_pairs};
use crate::sheets::store::{update_cells_by_header, update_summary_cell};
use crate::sheets::tabs;
use crate::state::AppState;

const UPDATED: &str = "✅ Данные обновлены";
const UPDATE_FAILED: &str = "❌ Не удалось обновить данные";

/// "Добавить информацию" menu button.
pub async fn start_add_info(bot: Bot, dialogue: BotDialogue, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    bot.send_message(message.chat.id, "Введите ID резюме").await?;
    dialogue.update(State::AwaitingInfoId).await?;
    Ok(())
}

pub async fn receive_resume_id(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    let Some(resume_id) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        bot.send_message(msg.chat.id, "Введите ID резюме текстом.").await?;
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Выберите категорию")
        .reply_markup(keyboards::categories())
        .await?;
    dialogue
        .update(State::ChoosingCategory(InfoTarget {
            resume_id: resume_id.to_string(),
        }))
        .await?;
    Ok(())
}

/// Category button: route into the per-category conversation.
pub async fn on_category(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    let chat_id = message.chat.id;
    let resume_id = target.resume_id.clone();

    let pair_draft = PairDraft {
        resume_id: resume_id.clone(),
        collected: Vec::new(),
    };

    match q.data.as_deref() {
        Some("name") => {
            bot.send_message(chat_id, "Введите имя").await?;
            dialogue.update(State::AwaitingNameRu(target)).await?;
        }
        Some("surname") => {
            bot.send_message(chat_id, "Введите фамилию").await?;
            dialogue.update(State::AwaitingSurnameRu(target)).await?;
        }
        Some("patronymic") => {
            bot.send_message(chat_id, "Введите отчество").await?;
            dialogue.update(State::AwaitingPatronymic(target)).await?;
        }
        Some("date_of_birth") => {
            bot.send_message(chat_id, "Введите дату рождения (формат: 11.11.1111)")
                .await?;
            dialogue.update(State::AwaitingBirthDate(target)).await?;
        }
        Some("languages") => {
            bot.send_message(chat_id, "Выберите язык")
                .reply_markup(keyboards::languages())
                .await?;
            dialogue.update(State::ChoosingLanguage(pair_draft)).await?;
        }
        Some("location") => {
            bot.send_message(chat_id, "Введите страну").await?;
            dialogue.update(State::AwaitingCountry(target)).await?;
        }
        Some("date_of_exit") => {
            bot.send_message(
                chat_id,
                "Введите дату выхода на новое место работы (формат: 11.11.1111)",
            )
            .await?;
            dialogue.update(State::AwaitingExitDate(target)).await?;
        }
        Some("salary") => {
            bot.send_message(chat_id, "Введите зарплатные ожидания строго в формате 100000 USD")
                .await?;
            dialogue.update(State::AwaitingSalary(target)).await?;
        }
        Some("add_contacts") => {
            bot.send_message(chat_id, "Выберите контакт")
                .reply_markup(keyboards::contacts())
                .await?;
            dialogue.update(State::ChoosingContact(pair_draft)).await?;
        }
        _ => {}
    }
    Ok(())
}

fn message_text(msg: &Message) -> Option<String> {
    msg.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

async fn report(bot: &Bot, chat_id: ChatId, ok: bool) -> HandlerResult {
    bot.send_message(chat_id, if ok { UPDATED } else { UPDATE_FAILED })
        .await?;
    Ok(())
}

// ── Name / surname ──────────────────────────────────────────────────────────

pub async fn receive_name_ru(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
) -> HandlerResult {
    let Some(ru) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите имя текстом.").await?;
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Введите английское имя").await?;
    dialogue
        .update(State::AwaitingNameEn(NameDraft {
            resume_id: target.resume_id,
            ru,
        }))
        .await?;
    Ok(())
}

pub async fn receive_name_en(
    bot: Bot,
    dialogue: BotDialogue,
    draft: NameDraft,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(en) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите английское имя текстом.").await?;
        return Ok(());
    };
    let ok = write_bilingual(&state, tabs::NAME, "Имя", &draft, &en).await;
    report(&bot, msg.chat.id, ok).await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

pub async fn receive_surname_ru(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
) -> HandlerResult {
    let Some(ru) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите фамилию текстом.").await?;
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Введите английскую фамилию").await?;
    dialogue
        .update(State::AwaitingSurnameEn(NameDraft {
            resume_id: target.resume_id,
            ru,
        }))
        .await?;
    Ok(())
}

pub async fn receive_surname_en(
    bot: Bot,
    dialogue: BotDialogue,
    draft: NameDraft,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(en) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите английскую фамилию текстом.")
            .await?;
        return Ok(());
    };
    let ok = write_bilingual(&state, tabs::SURNAME, "Фамилия", &draft, &en).await;
    report(&bot, msg.chat.id, ok).await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

/// Writes a ru/en pair into its facet worksheet and the Russian spelling into
/// the summary column.
async fn write_bilingual(
    state: &AppState,
    tab: &str,
    summary_header: &str,
    draft: &NameDraft,
    en: &str,
) -> bool {
    let facet = update_cells_by_header(
        &state.sheets,
        tab,
        &draft.resume_id,
        &[
            ("На русском".to_string(), draft.ru.clone()),
            ("На английском".to_string(), en.to_string()),
        ],
    )
    .await;
    let summary =
        update_summary_cell(&state.sheets, &draft.resume_id, summary_header, &draft.ru).await;
    match (facet, summary) {
        (Ok(f), Ok(s)) => f > 0 && s > 0,
        (facet, summary) => {
            if let Err(e) = facet {
                error!("facet update failed: {e}");
            }
            if let Err(e) = summary {
                error!("summary update failed: {e}");
            }
            false
        }
    }
}

// ── Single-cell categories ──────────────────────────────────────────────────

pub async fn receive_patronymic(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    write_single_summary_cell(bot, dialogue, target, msg, state, "Отчество").await
}

pub async fn receive_birth_date(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    write_single_summary_cell(bot, dialogue, target, msg, state, "Дата рождения").await
}

pub async fn receive_exit_date(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    write_single_summary_cell(
        bot,
        dialogue,
        target,
        msg,
        state,
        "Возможная дата выхода на новое место работы",
    )
    .await
}

async fn write_single_summary_cell(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
    state: Arc<AppState>,
    header: &str,
) -> HandlerResult {
    let Some(value) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите значение текстом.").await?;
        return Ok(());
    };
    let ok = match update_summary_cell(&state.sheets, &target.resume_id, header, &value).await {
        Ok(written) => written > 0,
        Err(e) => {
            error!("summary update failed: {e}");
            false
        }
    };
    report(&bot, msg.chat.id, ok).await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

// ── Languages ───────────────────────────────────────────────────────────────

pub async fn on_language_chosen(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairDraft,
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(language) = q
        .data
        .as_deref()
        .and_then(|d| d.strip_prefix(keyboards::LANG_PREFIX))
    else {
        return Ok(());
    };
    let Some(message) = q.message else {
        return Ok(());
    };
    bot.send_message(message.chat.id, "Введите уровень").await?;
    dialogue
        .update(State::AwaitingLanguageLevel(PairValueDraft {
            resume_id: draft.resume_id,
            key: language.to_string(),
            collected: draft.collected,
        }))
        .await?;
    Ok(())
}

pub async fn receive_language_level(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairValueDraft,
    msg: Message,
) -> HandlerResult {
    let Some(level) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите уровень текстом.").await?;
        return Ok(());
    };
    let mut collected = draft.collected;
    collected.push((draft.key, level));
    bot.send_message(msg.chat.id, "Добавить ещё язык?")
        .reply_markup(keyboards::more_languages())
        .await?;
    dialogue
        .update(State::ConfirmingMoreLanguages(PairDraft {
            resume_id: draft.resume_id,
            collected,
        }))
        .await?;
    Ok(())
}

pub async fn on_more_languages(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairDraft,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    match q.data.as_deref() {
        Some("lang_more") => {
            bot.send_message(message.chat.id, "Выберите язык")
                .reply_markup(keyboards::languages())
                .await?;
            dialogue.update(State::ChoosingLanguage(draft)).await?;
        }
        Some("lang_done") => {
            let summary_value = join_pairs(&draft.collected);
            let ok = write_pairs(
                &state,
                tabs::FOREIGN_LANGUAGES,
                "Иностранные языки",
                &draft,
                &summary_value,
            )
            .await;
            report(&bot, message.chat.id, ok).await?;
            dialogue.update(State::Idle).await?;
        }
        _ => {}
    }
    Ok(())
}

// ── Location ────────────────────────────────────────────────────────────────

pub async fn receive_country(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
) -> HandlerResult {
    let Some(country) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите страну текстом.").await?;
        return Ok(());
    };
    bot.send_message(msg.chat.id, "Введите город").await?;
    dialogue
        .update(State::AwaitingCity(LocationDraft {
            resume_id: target.resume_id,
            country,
        }))
        .await?;
    Ok(())
}

pub async fn receive_city(
    bot: Bot,
    dialogue: BotDialogue,
    draft: LocationDraft,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(city) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите город текстом.").await?;
        return Ok(());
    };

    let facet = update_cells_by_header(
        &state.sheets,
        tabs::LOCATION,
        &draft.resume_id,
        &[
            ("Страна".to_string(), draft.country.clone()),
            ("Город".to_string(), city.clone()),
        ],
    )
    .await;
    let summary = update_summary_cell(
        &state.sheets,
        &draft.resume_id,
        "Локация",
        &format!("{}, {city}", draft.country),
    )
    .await;
    let ok = matches!((facet, summary), (Ok(f), Ok(s)) if f > 0 && s > 0);
    report(&bot, msg.chat.id, ok).await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

// ── Salary (re-runs the rate lookup) ────────────────────────────────────────

pub async fn receive_salary(
    bot: Bot,
    dialogue: BotDialogue,
    target: InfoTarget,
    msg: Message,
    state: Arc<AppState>,
) -> HandlerResult {
    let Some(salary) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите значение текстом.").await?;
        return Ok(());
    };

    let mut parts = salary.split_whitespace();
    let amount = parts.next().and_then(|v| v.parse::<i64>().ok());
    let currency = parts.next().and_then(Currency::parse);
    let (Some(amount), Some(currency)) = (amount, currency) else {
        bot.send_message(msg.chat.id, "❌ Формат: 100000 USD (валюты: RUB, USD, EUR, BYN)")
            .await?;
        return Ok(());
    };

    let normalized = format!("{amount} {}", currency.code());
    let mut ok = match update_summary_cell(
        &state.sheets,
        &target.resume_id,
        "Зарплатные ожидания (на руки)",
        &normalized,
    )
    .await
    {
        Ok(written) => written > 0,
        Err(e) => {
            error!("summary update failed: {e}");
            false
        }
    };

    match compute_rates(&state, (currency, amount)).await {
        Ok((cis, eu)) => {
            for (tab, rates) in [(tabs::CLIENT_RATE_CIS, &cis), (tabs::CLIENT_RATE_EU_US, &eu)] {
                match update_cells_by_header(
                    &state.sheets,
                    tab,
                    &target.resume_id,
                    &client_rate_updates(rates),
                )
                .await
                {
                    Ok(written) => ok &= written > 0,
                    Err(e) => {
                        error!("rate update on '{tab}' failed: {e}");
                        ok = false;
                    }
                }
            }
        }
        Err(e) => {
            error!("rate lookup failed: {e}");
            bot.send_message(
                msg.chat.id,
                "⚠️ Не удалось пересчитать ставки. Проверьте настройки.",
            )
            .await?;
        }
    }

    report(&bot, msg.chat.id, ok).await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}

// ── Contacts ────────────────────────────────────────────────────────────────

pub async fn on_contact_chosen(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairDraft,
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(field) = q
        .data
        .as_deref()
        .and_then(|d| d.strip_prefix(keyboards::CONTACT_PREFIX))
    else {
        return Ok(());
    };
    let Some(message) = q.message else {
        return Ok(());
    };
    let _ = bot.delete_message(message.chat.id, message.id).await;
    bot.send_message(
        message.chat.id,
        "Введите контакт (например: @username или ссылка на профиль)",
    )
    .await?;
    dialogue
        .update(State::AwaitingContactValue(PairValueDraft {
            resume_id: draft.resume_id,
            key: field.to_string(),
            collected: draft.collected,
        }))
        .await?;
    Ok(())
}

pub async fn receive_contact_value(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairValueDraft,
    msg: Message,
) -> HandlerResult {
    let Some(value) = message_text(&msg) else {
        bot.send_message(msg.chat.id, "Введите контакт текстом.").await?;
        return Ok(());
    };
    let mut collected = draft.collected;
    collected.push((draft.key, value));
    bot.send_message(msg.chat.id, "Добавить ещё контакт?")
        .reply_markup(keyboards::more_contacts())
        .await?;
    dialogue
        .update(State::ConfirmingMoreContacts(PairDraft {
            resume_id: draft.resume_id,
            collected,
        }))
        .await?;
    Ok(())
}

pub async fn on_more_contacts(
    bot: Bot,
    dialogue: BotDialogue,
    draft: PairDraft,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };
    match q.data.as_deref() {
        Some("contact_more") => {
            bot.send_message(message.chat.id, "Выберите контакт")
                .reply_markup(keyboards::contacts())
                .await?;
            dialogue.update(State::ChoosingContact(draft)).await?;
        }
        Some("contact_done") => {
            let summary_value = draft
                .collected
                .iter()
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let ok = write_pairs(&state, tabs::CONTACTS, "Контакты", &draft, &summary_value).await;
            report(&bot, message.chat.id, ok).await?;
            dialogue.update(State::Idle).await?;
        }
        _ => {}
    }
    Ok(())
}

/// Writes collected key→value pairs into a facet worksheet (keys are column
/// headers there) and a joined rendering into the summary column.
async fn write_pairs(
    state: &AppState,
    tab: &str,
    summary_header: &str,
    draft: &PairDraft,
    summary_value: &str,
) -> bool {
    let facet =
        update_cells_by_header(&state.sheets, tab, &draft.resume_id, &draft.collected).await;
    let summary =
        update_summary_cell(&state.sheets, &draft.resume_id, summary_header, summary_value).await;
    match (facet, summary) {
        (Ok(f), Ok(s)) => f > 0 && s > 0,
        (facet, summary) => {
            if let Err(e) = facet {
                error!("facet update failed: {e}");
            }
            if let Err(e) = summary {
                error!("summary update failed: {e}");
            }
            false
        }
    }
}
