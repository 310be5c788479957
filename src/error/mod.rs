pub mod settings;

pub use settings::SettingsError;

// Ошибки таблицы и кодеков живут в отдельном крейте, чтобы их можно было
// использовать без зависимости от `config` и `tracing-subscriber`.
pub use oahash_error::{
    CodecError, ErrorExt, GenericError, OaResult, ResultExt, StackError, StatusCode, TableError,
};
