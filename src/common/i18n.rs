// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (sem leitura de disco em produção)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas, indexadas por idioma e depois por chave.
#[derive(Debug, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("catálogo '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Traduz `key` para `lang`. Cai para o inglês e, por fim, devolve a própria chave.
    /// Placeholders no formato `{nome}` são trocados pelos valores de `args`.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        let mut message = template.to_string();
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_same_keys_as_english() {
        let store = I18nStore::load().unwrap();
        let english = &store.catalogs["en"];
        for lang in store.catalogs.keys() {
            let catalog = &store.catalogs[lang];
            for key in english.keys() {
                assert!(catalog.contains_key(key), "'{}' sem a chave '{}'", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_to_the_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("de", "error.invalid_credentials", &[]),
            "Invalid e-mail or password."
        );
        assert_eq!(store.translate("pt", "no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn interpolates_named_arguments() {
        let store = I18nStore::load().unwrap();
        let message = store.translate(
            "pt",
            "error.customer_code_exists",
            &[("code", "ACME".to_string())],
        );
        assert_eq!(message, "Já existe um cliente com o código 'ACME'.");
    }
}
