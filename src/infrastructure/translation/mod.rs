mod http_translation_client;
mod scaffold_translation_provider;

pub use http_translation_client::HttpTranslationClient;
pub use scaffold_translation_provider::ScaffoldTranslationProvider;
