//! Telegram front-end: commands, dispatcher tree and the conversation flows.
//!
//! Split per flow: `scan` (batch intake), `delete`, `add_info`, with
//! `keyboards` and the dialogue `state` shared between them.

pub mod add_info;
pub mod delete;
pub mod keyboards;
pub mod scan;
pub mod state;

use std::sync::Arc;

use teloxide::dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::state::{BotDialogue, HandlerResult, State};
use crate::state::AppState;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "главное меню")]
    Start,
}

/// Runs the dispatcher until shutdown.
pub async fn run(bot: Bot, app_state: Arc<AppState>) {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<State>::new(), app_state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    let commands = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start));

    let messages = Update::filter_message()
        .branch(commands)
        .branch(case![State::ReceivingResumes(batch)].endpoint(scan::receive_document))
        .branch(case![State::ConfirmingAddMore(batch)].endpoint(scan::receive_document))
        .branch(case![State::AwaitingDeleteId].endpoint(delete::receive_delete_id))
        .branch(case![State::AwaitingInfoId].endpoint(add_info::receive_resume_id))
        .branch(case![State::AwaitingNameRu(target)].endpoint(add_info::receive_name_ru))
        .branch(case![State::AwaitingNameEn(draft)].endpoint(add_info::receive_name_en))
        .branch(case![State::AwaitingSurnameRu(target)].endpoint(add_info::receive_surname_ru))
        .branch(case![State::AwaitingSurnameEn(draft)].endpoint(add_info::receive_surname_en))
        .branch(case![State::AwaitingPatronymic(target)].endpoint(add_info::receive_patronymic))
        .branch(case![State::AwaitingBirthDate(target)].endpoint(add_info::receive_birth_date))
        .branch(
            case![State::AwaitingLanguageLevel(draft)]
                .endpoint(add_info::receive_language_level),
        )
        .branch(case![State::AwaitingCountry(target)].endpoint(add_info::receive_country))
        .branch(case![State::AwaitingCity(draft)].endpoint(add_info::receive_city))
        .branch(case![State::AwaitingExitDate(target)].endpoint(add_info::receive_exit_date))
        .branch(case![State::AwaitingSalary(target)].endpoint(add_info::receive_salary))
        .branch(
            case![State::AwaitingContactValue(draft)]
                .endpoint(add_info::receive_contact_value),
        );

    let callbacks = Update::filter_callback_query()
        // Main-menu buttons work from any state.
        .branch(callback_data("scan").endpoint(scan::start_scan))
        .branch(callback_data("delete_record").endpoint(delete::start_delete))
        .branch(callback_data("add_info").endpoint(add_info::start_add_info))
        .branch(
            callback_prefix(keyboards::CONFIRM_DELETE_PREFIX)
                .endpoint(delete::on_confirm_delete),
        )
        .branch(callback_data("cancel_delete").endpoint(delete::on_cancel_delete))
        .branch(
            case![State::ConfirmingAddMore(batch)]
                .branch(callback_data("add_more_yes").endpoint(scan::on_more_yes))
                .branch(callback_data("add_more_no").endpoint(scan::on_more_no)),
        )
        .branch(case![State::ChoosingCategory(target)].endpoint(add_info::on_category))
        .branch(case![State::ChoosingLanguage(draft)].endpoint(add_info::on_language_chosen))
        .branch(
            case![State::ConfirmingMoreLanguages(draft)].endpoint(add_info::on_more_languages),
        )
        .branch(case![State::ChoosingContact(draft)].endpoint(add_info::on_contact_chosen))
        .branch(case![State::ConfirmingMoreContacts(draft)].endpoint(add_info::on_more_contacts));

    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .branch(messages)
        .branch(callbacks)
}

fn callback_data(expected: &'static str) -> UpdateHandler<anyhow::Error> {
    dptree::filter(move |q: CallbackQuery| q.data.as_deref() == Some(expected))
}

fn callback_prefix(prefix: &'static str) -> UpdateHandler<anyhow::Error> {
    dptree::filter(move |q: CallbackQuery| {
        q.data.as_deref().is_some_and(|d| d.starts_with(prefix))
    })
}

/// `/start` — recruiters are identified by their Telegram username, so a
/// missing username blocks the menu.
async fn start(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    let has_username = msg.from().is_some_and(|u| u.username.is_some());
    if !has_username {
        bot.send_message(
            msg.chat.id,
            "Пожалуйста, укажите ваш username в настройках Telegram, чтобы я мог вас идентифицировать.",
        )
        .await?;
        return Ok(());
    }
    bot.send_message(msg.chat.id, "Это бот для анализа резюме к требованиям вакансии.")
        .reply_markup(keyboards::main_menu())
        .await?;
    dialogue.update(State::Idle).await?;
    Ok(())
}
