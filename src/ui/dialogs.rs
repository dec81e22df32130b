use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// Title used for every dialog the loader shows.
pub const DIALOG_TITLE: &str = "Haggle Mod Loader";

const RETRY_LABEL: &str = "Retry";
const CANCEL_LABEL: &str = "Cancel";

/// User's answer to the first-run prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Retry,
    Cancel,
}

/// Blocking, modal user prompts.
#[cfg_attr(test, mockall::automock)]
pub trait UserPrompt {
    /// Show an error with a single OK button and wait for it to be dismissed.
    fn fatal(&self, message: &str);

    /// Ask the user to retry or cancel.
    fn retry_or_cancel(&self, message: &str) -> PromptChoice;
}

/// [`UserPrompt`] using native message boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePrompt;

impl UserPrompt for NativePrompt {
    fn fatal(&self, message: &str) {
        tracing::error!("{}", message);

        let _ = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(DIALOG_TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn retry_or_cancel(&self, message: &str) -> PromptChoice {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(DIALOG_TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::OkCancelCustom(
                RETRY_LABEL.to_string(),
                CANCEL_LABEL.to_string(),
            ))
            .show();

        let choice = choice_from_result(&result);
        tracing::info!("First-run prompt answered: {:?}", choice);
        choice
    }
}

/// Backends report custom buttons either by label or as plain Ok/Cancel.
fn choice_from_result(result: &MessageDialogResult) -> PromptChoice {
    match result {
        MessageDialogResult::Ok | MessageDialogResult::Yes => PromptChoice::Retry,
        MessageDialogResult::Custom(label) if label == RETRY_LABEL => PromptChoice::Retry,
        _ => PromptChoice::Cancel,
    }
}
