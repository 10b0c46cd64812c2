//! Required-field checks run before a mutation is dispatched.
//!
//! Each check returns the message to show the user. Callers surface it as
//! a single warning and skip the request.

use crate::domain::{NewReport, NewUser, PointDraft, Registration, UserPatch};
use crate::ApiError;
use once_cell::sync::Lazy;
use regex::Regex;

// Deliberately loose: something@something.tld with no whitespace.
static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub const REPORT_REQUIRED: &str = "Title and address are required.";
pub const USER_REQUIRED: &str = "Name, email and password are required.";
pub const LOGIN_REQUIRED: &str = "Email and password are required.";
pub const POINT_REQUIRED: &str = "Name and address are required.";
pub const BAD_EMAIL: &str = "Enter a valid email address.";
pub const BLANK_FIELD: &str = "Name and email cannot be blank.";

pub fn looks_like_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email.trim()))
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn fail(message: &str) -> Result<(), ApiError> {
    Err(ApiError::Validation(message.to_string()))
}

pub fn report_draft(draft: &NewReport) -> Result<(), ApiError> {
    if blank(&draft.titulo) || blank(&draft.direccion) {
        return fail(REPORT_REQUIRED);
    }
    Ok(())
}

pub fn new_user(user: &NewUser) -> Result<(), ApiError> {
    // ---
    if blank(&user.nombre) || blank(&user.email) || blank(&user.password) {
        return fail(USER_REQUIRED);
    }
    if !looks_like_email(&user.email) {
        return fail(BAD_EMAIL);
    }
    Ok(())
}

pub fn user_patch(patch: &UserPatch) -> Result<(), ApiError> {
    // ---
    if patch.nombre.as_deref().is_some_and(blank) || patch.email.as_deref().is_some_and(blank) {
        return fail(BLANK_FIELD);
    }
    match patch.email.as_deref() {
        Some(email) if !looks_like_email(email) => fail(BAD_EMAIL),
        _ => Ok(()),
    }
}

pub fn login(email: &str, password: &str) -> Result<(), ApiError> {
    if blank(email) || blank(password) {
        return fail(LOGIN_REQUIRED);
    }
    Ok(())
}

pub fn registration(registration: &Registration) -> Result<(), ApiError> {
    // ---
    if blank(&registration.nombre) || blank(&registration.email) || blank(&registration.password) {
        return fail(USER_REQUIRED);
    }
    if !looks_like_email(&registration.email) {
        return fail(BAD_EMAIL);
    }
    Ok(())
}

pub fn point_draft(draft: &PointDraft) -> Result<(), ApiError> {
    if blank(&draft.nombre) || blank(&draft.direccion) {
        return fail(POINT_REQUIRED);
    }
    Ok(())
}
