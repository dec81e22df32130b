// User-facing prompts
//
// The loader has no window of its own; everything the user sees outside the
// console goes through modal message boxes.

pub mod dialogs;

pub use dialogs::{NativePrompt, PromptChoice, UserPrompt, DIALOG_TITLE};
