// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing texts and button labels emitted by the controller.
//!
//! Transports render these verbatim; formatting is their concern.

pub const SELECT_FIELD: &str = "Select data to enter:";
pub const RESUME_PROMPT: &str = "You have an incomplete record. Let's finish it!";
pub const RESUMED: &str = "Resuming your incomplete record.";
pub const NOTHING_TO_RESUME: &str = "There is no incomplete record to resume. Starting a new case.";
pub const CONFIRM_NEW_CASE: &str =
    "Starting a new case deletes your incomplete record. Are you sure?";
pub const NEW_CASE_STARTED: &str = "Starting a new case.";
pub const ATTACHMENT_PROMPT: &str = "You can now upload an image (optional) or type /skip if none.";
pub const ATTACHMENT_EXPECTED: &str = "Please upload an image, or type /skip to continue without one.";
pub const IMAGE_SAVED: &str = "Image saved.";
pub const IMAGE_FAILED: &str = "Could not store the image. Please try again or type /skip.";
pub const NO_FIELD_FOR_IMAGE: &str = "No field in progress to attach image.";
pub const NEXT_ACTION: &str = "What would you like to do next?";
pub const REVIEW_HEADER: &str = "Here's the data you've entered:";
pub const NO_DATA: &str = "You haven't entered any data yet.";
pub const ATTACHMENT_CAPTION: &str = "Attached image";
pub const IMAGE_NOT_FOUND: &str = "image not found";
pub const CONFIRM_SAVE: &str = "Do you want to save this data?";
pub const SAVED_COMPLETE: &str = "Case saved successfully.";
pub const SAVED_PARTIAL: &str = "Partial record saved for future completion.";
pub const SAVE_FAILED: &str =
    "Something went wrong while saving. Your entries are still here; please try again.";
pub const LOAD_FAILED: &str = "Something went wrong while loading your records. Please try again.";
pub const DELETE_FAILED: &str =
    "Something went wrong while deleting your record. It was not deleted; please try again.";
pub const CONFIRM_CANCEL: &str =
    "Cancelling deletes your latest saved record and any uploaded image. Are you sure?";
pub const ENTRY_CANCELLED: &str = "Entry cancelled.";
pub const CANCELLED: &str = "Cancelled.";
pub const SEND_START: &str = "Send /start to begin a new case.";
pub const BUSY: &str = "Still working on your previous messages. Please send that again in a moment.";
pub const SESSION_EXPIRED: &str =
    "Your session expired after a period of inactivity. Send /start to continue.";

/// Prompt shown when waiting for a value for the field labeled `label`.
pub fn enter_value(label: &str) -> String {
    format!("Enter value for {label}:")
}

/// Line listing missing field labels.
pub fn missing_fields(labels: &[&str]) -> String {
    format!("Missing fields: {}", labels.join(", "))
}

pub mod buttons {
    pub const RESUME: &str = "Resume";
    pub const NEW_CASE: &str = "New case";
    pub const CONFIRM_NEW_CASE: &str = "Yes, start over";
    pub const BACK: &str = "Back";
    pub const ADD_MORE: &str = "Add More";
    pub const REVIEW: &str = "Review Data";
    pub const FINISH_REVIEW: &str = "Finish & Review";
    pub const CONFIRM_SAVE: &str = "Confirm & Save";
    pub const CANCEL: &str = "Cancel";
    pub const CONFIRM_CANCEL: &str = "Yes, delete it";
    pub const ABORT_CANCEL: &str = "No, keep editing";
    pub const SKIP: &str = "Skip";
}
