//! Per-chat dialogue state.
//!
//! One flat enum drives all three conversations (scan, delete, add-info);
//! the payload structs carry what each step has collected so far. State
//! lives per chat in the dispatcher's in-memory storage — two recruiters
//! never share a draft.

use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::intake::batch::Batch;

pub type BotDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerResult = Result<(), anyhow::Error>;

/// The resume id an add-info conversation is editing.
#[derive(Debug, Clone)]
pub struct InfoTarget {
    pub resume_id: String,
}

/// Name/surname flow after the Russian spelling arrived.
#[derive(Debug, Clone)]
pub struct NameDraft {
    pub resume_id: String,
    pub ru: String,
}

/// Location flow after the country arrived.
#[derive(Debug, Clone)]
pub struct LocationDraft {
    pub resume_id: String,
    pub country: String,
}

/// Accumulator for repeated key→value entry (languages, contacts).
#[derive(Debug, Clone)]
pub struct PairDraft {
    pub resume_id: String,
    pub collected: Vec<(String, String)>,
}

/// `PairDraft` plus the key whose value is being typed.
#[derive(Debug, Clone)]
pub struct PairValueDraft {
    pub resume_id: String,
    pub key: String,
    pub collected: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub enum State {
    #[default]
    Idle,

    // Scan flow.
    ReceivingResumes(Batch),
    ConfirmingAddMore(Batch),
    /// Locked while a batch is being processed.
    ProcessingBatch,

    // Delete flow.
    AwaitingDeleteId,

    // Add-info flow.
    AwaitingInfoId,
    ChoosingCategory(InfoTarget),
    AwaitingNameRu(InfoTarget),
    AwaitingNameEn(NameDraft),
    AwaitingSurnameRu(InfoTarget),
    AwaitingSurnameEn(NameDraft),
    AwaitingPatronymic(InfoTarget),
    AwaitingBirthDate(InfoTarget),
    ChoosingLanguage(PairDraft),
    AwaitingLanguageLevel(PairValueDraft),
    ConfirmingMoreLanguages(PairDraft),
    AwaitingCountry(InfoTarget),
    AwaitingCity(LocationDraft),
    AwaitingExitDate(InfoTarget),
    AwaitingSalary(InfoTarget),
    ChoosingContact(PairDraft),
    AwaitingContactValue(PairValueDraft),
    ConfirmingMoreContacts(PairDraft),
}
