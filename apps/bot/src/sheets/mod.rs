//! The spreadsheet-backed candidate store.
//!
//! `client` is a thin Google Sheets v4 REST wrapper; `store` holds the
//! domain operations (duplicate check, delete-everywhere, header-addressed
//! updates, rate-table range search); `rows` assembles worksheet rows from
//! a candidate profile.

mod client;
pub mod rows;
pub mod store;

pub use client::{SheetsClient, SheetsError};

/// Worksheet titles of the candidate spreadsheet.
///
/// These are data, not code: the bot points at a live spreadsheet whose tabs
/// already carry these names, so they stay in Russian.
pub mod tabs {
    /// The main summary worksheet, one row per candidate.
    pub const SUMMARY: &str = "Свободные ресурсы на аутстафф";

    pub const SURNAME: &str = "Фамилия";
    pub const NAME: &str = "Имя";
    pub const ROLES: &str = "Должности/Специализации";
    pub const LOCATION: &str = "Локация";
    pub const GRADES: &str = "Грейды специалистов";
    pub const PROGRAMMING_LANGUAGES: &str = "Языки программирования";
    pub const FRAMEWORKS: &str = "Frameworks & Libraries";
    pub const TECHNOLOGIES: &str = "Технологии и инструменты";
    pub const PROJECT_INDUSTRIES: &str = "Отрасли проектов";
    pub const FOREIGN_LANGUAGES: &str = "Иностранные языки";
    pub const PORTFOLIO: &str = "Портфолио";
    pub const WORK_SCHEDULE: &str = "Формат работы";
    pub const EMPLOYMENT_FORM: &str = "Форма трудоустройства";
    pub const CONTACTS: &str = "Контакты";
    pub const AVAILABILITY: &str = "Доступность кандидатов";

    /// Per-candidate client rates, appended by the intake pipeline.
    pub const CLIENT_RATE_CIS: &str = "Рейт для Заказчика (СНГ)";
    pub const CLIENT_RATE_EU_US: &str = "Рейт для Заказчика (ЕС/США)";

    /// Rate-calculation tables searched by salary and rewritten daily by the
    /// currency updater.
    pub const RATE_CALC_CONTRACT_CIS: &str = "Расчет ставки (штат/контракт) СНГ";
    pub const RATE_CALC_CONTRACT_EU_US: &str = "Расчет ставки (штат/контракт) ЕС/США";
    pub const RATE_CALC_SOLE_TRADER_CIS: &str = "Расчет ставки (ИП) СНГ";
    pub const RATE_CALC_SOLE_TRADER_EU_US: &str = "Расчет ставки (ИП) ЕС/США";
    pub const RATE_CALC_SELF_EMPLOYED_CIS: &str = "Расчет ставки (Самозанятый) СНГ";
    pub const RATE_CALC_SELF_EMPLOYED_EU_US: &str = "Расчет ставки (Самозанятый) ЕС/США";

    pub const RATE_CALC_ALL: &[&str] = &[
        RATE_CALC_CONTRACT_CIS,
        RATE_CALC_CONTRACT_EU_US,
        RATE_CALC_SOLE_TRADER_CIS,
        RATE_CALC_SOLE_TRADER_EU_US,
        RATE_CALC_SELF_EMPLOYED_CIS,
        RATE_CALC_SELF_EMPLOYED_EU_US,
    ];
}
