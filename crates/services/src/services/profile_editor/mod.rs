//! Schema-driven profile editor.
//!
//! The server describes the editable settings as a category -> setting
//! structure at runtime; this module renders that structure into a form,
//! validates submissions against each setting's declared type and saves
//! the result.

pub mod coercion;
pub mod form;
pub mod schema;
pub mod session;

pub use coercion::coerce;
pub use form::{
    Control, FormCategory, FormField, FormSpec, NumberStep, RawFormValues, SchemaFormModel,
};
pub use schema::{
    EditorSchema, ProfileValues, SettingDescriptor, SettingKind, SettingOption, SettingType,
};
pub use session::{EditSession, ProfileEditor};
