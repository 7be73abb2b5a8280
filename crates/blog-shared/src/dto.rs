//! Form payloads - `application/x-www-form-urlencoded` bodies of the site's forms.
//!
//! Every field defaults to empty so a missing field fails validation with a
//! field message instead of rejecting the whole request.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(min = 2, max = 30, message = "Field must be between 2 and 30 characters long."))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30, message = "Field must be between 2 and 30 characters long."))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Field must be at least 6 characters long."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match."))]
    pub confirm_password: String,
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

/// Sign-in form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    /// Checkbox; any submitted value means "keep me signed in".
    pub remember: Option<String>,
    /// Local path to return to after signing in.
    pub next: Option<String>,
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

impl LoginForm {
    pub fn remember_me(&self) -> bool {
        self.remember.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// New post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(min = 1, max = 100, message = "Field must be between 1 and 100 characters long."))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Field must be between 1 and 10000 characters long."))]
    pub content: String,
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

/// Account details form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AccountForm {
    #[validate(length(min = 2, max = 30, message = "Field must be between 2 and 30 characters long."))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30, message = "Field must be between 2 and 30 characters long."))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
}

/// Body of forms that carry nothing but the CSRF token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CsrfOnlyForm {
    pub csrf_token: Option<String>,
}
