//! Localized titles and details for caller-facing problems.
//!
//! Lookup is a pure function of `(locale, use_case, key)`. Resolution order:
//! the requested locale's use-case entry, its `Common` entry, then the same
//! two in `en-US`, then a generic message.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const COMMON: &str = "Common";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn parse(tag: &str) -> Result<Self, String> {
        let tag = tag.trim();
        if LOCALE_TAG.is_match(tag) {
            Ok(Locale(tag.to_string()))
        } else {
            Err(format!("invalid locale tag '{}', expected e.g. en-US", tag))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Entries = &'static [(&'static str, &'static [(&'static str, &'static str, &'static str)])];
type Table = HashMap<&'static str, HashMap<&'static str, HashMap<&'static str, (&'static str, &'static str)>>>;

const EN_US: Entries = &[
    (COMMON, &[
        ("StorageFailure", "Internal error", "An unexpected error occurred while accessing stored data. Please try again later."),
        ("DataIntegrity", "Internal error", "Stored data is inconsistent. Please contact support."),
        ("AdminRequired", "Forbidden", "Only administrators are allowed to perform this action."),
        ("MissingUserID", "Missing User ID", "User ID is required to access this resource."),
        ("ListNotFound", "List not found", "The requested list was not found."),
        ("InvalidListType", "Invalid list type", "The list type is invalid. Allowed types: MOVIE, BRAND."),
        ("ItemsNotFound", "Items not found", "One or more of the given item IDs do not match an active item."),
        ("ItemAlreadyInList", "Item already in list", "One or more items are already part of this list."),
        ("MalformedCombination", "Malformed combination", "A combination must pair two different items."),
        ("Unexpected", "Unexpected error", "An unexpected error occurred."),
    ]),
    ("CreateMovieUseCase", &[
        ("InvalidMovieData", "Invalid movie data", "A movie needs a name, a positive year and an external ID."),
        ("MovieAlreadyExists", "Movie already exists", "A movie with the same external ID already exists. Please check the external ID and try again."),
    ]),
    ("CreateBrandUseCase", &[
        ("InvalidBrandData", "Invalid brand data", "The provided brand data is invalid. Please review the input fields."),
        ("BrandAlreadyExists", "Conflict", "A brand with the same name already exists in the system."),
    ]),
    ("CreateListUseCase", &[
        ("InvalidListData", "Invalid list data", "A list needs a non-empty name."),
        ("NotEnoughItems", "Bad Request", "You must provide at least two items to create a list."),
        ("ListAlreadyExists", "Conflict", "A list with this name already exists. Please choose a different name."),
    ]),
    ("AddItemsListUseCase", &[
        ("NoItemsProvided", "No items provided", "At least one item ID must be provided."),
        ("ItemAlreadyInList", "Item already in list", "One of the items is already part of the list. Remove it from the request and try again."),
    ]),
    ("VoteUseCase", &[
        ("CombinationNotFound", "Combination not found", "The combination does not belong to the given list."),
        ("WinnerNotFound", "Winner not found", "The chosen winner is not an active item."),
        ("WinnerNotInCombination", "Invalid winner", "The winner must be one of the two items of the combination."),
        ("VoteAlreadyRegistered", "Conflict", "This vote has already been registered for the selected combination."),
    ]),
];

const PT_BR: Entries = &[
    (COMMON, &[
        ("StorageFailure", "Erro interno", "Ocorreu um erro inesperado ao acessar os dados. Tente novamente mais tarde."),
        ("DataIntegrity", "Erro interno", "Os dados armazenados estão inconsistentes. Entre em contato com o suporte."),
        ("AdminRequired", "Proibido", "Apenas administradores podem realizar esta ação."),
        ("MissingUserID", "ID do usuário ausente", "O ID do usuário é obrigatório para acessar este recurso."),
        ("ListNotFound", "Lista não encontrada", "A lista solicitada não foi encontrada."),
        ("InvalidListType", "Tipo de lista inválido", "O tipo de lista é inválido. Tipos permitidos: MOVIE, BRAND."),
        ("ItemsNotFound", "Itens não encontrados", "Um ou mais IDs informados não correspondem a um item ativo."),
        ("ItemAlreadyInList", "Item já está na lista", "Um ou mais itens já fazem parte desta lista."),
    ]),
    ("CreateMovieUseCase", &[
        ("MovieAlreadyExists", "Filme já existe", "Já existe um filme com o mesmo ID externo."),
    ]),
    ("CreateListUseCase", &[
        ("NotEnoughItems", "Requisição inválida", "Informe pelo menos dois itens para criar uma lista."),
        ("ListAlreadyExists", "Conflito", "Já existe uma lista com este nome. Escolha outro nome."),
    ]),
    ("VoteUseCase", &[
        ("CombinationNotFound", "Combinação não encontrada", "A combinação não pertence à lista informada."),
        ("WinnerNotFound", "Vencedor não encontrado", "O vencedor escolhido não é um item ativo."),
        ("WinnerNotInCombination", "Vencedor inválido", "O vencedor deve ser um dos dois itens da combinação."),
        ("VoteAlreadyRegistered", "Conflito", "Este voto já foi registrado para a combinação selecionada."),
    ]),
];

const ES_ES: Entries = &[
    (COMMON, &[
        ("StorageFailure", "Error interno", "Ocurrió un error inesperado al acceder a los datos. Inténtelo de nuevo más tarde."),
        ("AdminRequired", "Prohibido", "Solo los administradores pueden realizar esta acción."),
        ("ListNotFound", "Lista no encontrada", "No se encontró la lista solicitada."),
        ("InvalidListType", "Tipo de lista no válido", "El tipo de lista no es válido. Tipos permitidos: MOVIE, BRAND."),
        ("ItemsNotFound", "Elementos no encontrados", "Uno o más IDs no corresponden a un elemento activo."),
        ("ItemAlreadyInList", "Elemento ya en la lista", "Uno o más elementos ya forman parte de esta lista."),
    ]),
    ("VoteUseCase", &[
        ("VoteAlreadyRegistered", "Conflicto", "Este voto ya ha sido registrado para la combinación seleccionada."),
        ("WinnerNotInCombination", "Ganador no válido", "El ganador debe ser uno de los dos elementos de la combinación."),
    ]),
];

fn build(entries: Entries) -> HashMap<&'static str, HashMap<&'static str, (&'static str, &'static str)>> {
    entries
        .iter()
        .map(|(use_case, keys)| {
            let keys = keys
                .iter()
                .map(|(key, title, detail)| (*key, (*title, *detail)))
                .collect();
            (*use_case, keys)
        })
        .collect()
}

lazy_static! {
    static ref LOCALE_TAG: Regex = Regex::new(r"^[a-z]{2}-[A-Z]{2}$").unwrap();
    static ref MESSAGES: Table = {
        let mut table = HashMap::new();
        table.insert("en-US", build(EN_US));
        table.insert("pt-BR", build(PT_BR));
        table.insert("es-ES", build(ES_ES));
        table
    };
}

fn find(locale: &str, use_case: &str, key: &str) -> Option<(&'static str, &'static str)> {
    let use_cases = MESSAGES.get(locale)?;
    use_cases
        .get(use_case)
        .and_then(|keys| keys.get(key))
        .or_else(|| use_cases.get(COMMON).and_then(|keys| keys.get(key)))
        .copied()
}

pub fn lookup(locale: &Locale, use_case: &str, key: &str) -> Message {
    let (title, detail) = find(locale.as_str(), use_case, key)
        .or_else(|| find(DEFAULT_LOCALE, use_case, key))
        .or_else(|| find(DEFAULT_LOCALE, COMMON, "Unexpected"))
        .unwrap_or(("Unexpected error", "An unexpected error occurred."));

    Message {
        title: title.to_string(),
        detail: detail.to_string(),
    }
}

pub fn supported_locales() -> Vec<&'static str> {
    let mut locales: Vec<_> = MESSAGES.keys().copied().collect();
    locales.sort_unstable();
    locales
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_use_case_message_in_requested_locale() {
        let pt = Locale::parse("pt-BR").unwrap();
        let message = lookup(&pt, "VoteUseCase", "VoteAlreadyRegistered");
        assert_eq!(message.title, "Conflito");
    }

    #[test]
    fn falls_back_to_common_then_english() {
        let es = Locale::parse("es-ES").unwrap();
        assert_eq!(lookup(&es, "VoteUseCase", "ListNotFound").title, "Lista no encontrada");
        assert_eq!(
            lookup(&es, "CreateListUseCase", "NotEnoughItems").detail,
            "You must provide at least two items to create a list."
        );
    }

    #[test]
    fn unknown_locale_and_key_get_generic_message() {
        let fr = Locale::parse("fr-FR").unwrap();
        assert_eq!(lookup(&fr, "VoteUseCase", "WinnerNotFound").title, "Winner not found");
        assert_eq!(lookup(&fr, "Nope", "Nothing").title, "Unexpected error");
    }

    #[test]
    fn rejects_malformed_locale_tags() {
        assert!(Locale::parse("english").is_err());
        assert!(Locale::parse("en_us").is_err());
        assert_eq!(Locale::default().as_str(), "en-US");
    }

    #[test]
    fn every_locale_is_listed() {
        assert_eq!(supported_locales(), vec!["en-US", "es-ES", "pt-BR"]);
    }
}
