//! HTML views
//!
//! Pages come in two render modes. A full navigation gets the whole document
//! (head, navbar, footer with the live viewer count); an htmx request gets
//! only the page's `content` block so it can be swapped into `<main>`.
//! Components are always fragments.
//!
//! Templates are compiled into the binary and escaped by minijinja based on
//! their `.html` extension.

use minijinja::{context, Environment, Value};
use serde::Serialize;

use crate::core::{Result, ValidationErrors};
use crate::directory::User;
use crate::presence::CHANGE_EVENT;
use crate::session::login_url;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("templates/base.html")),
    ("landing.html", include_str!("templates/landing.html")),
    ("login.html", include_str!("templates/login.html")),
    ("users.html", include_str!("templates/users.html")),
    ("components/user_row.html", include_str!("templates/components/user_row.html")),
    ("components/user_dialog.html", include_str!("templates/components/user_dialog.html")),
    ("components/errors.html", include_str!("templates/components/errors.html")),
    ("components/message.html", include_str!("templates/components/message.html")),
    ("components/connected.html", include_str!("templates/components/connected.html")),
];

/// Block holding a page's swappable content
const CONTENT_BLOCK: &str = "content";

/// How much of a page to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Whole document with shared chrome
    Full,
    /// Only the page's content block
    Fragment,
}

impl RenderMode {
    /// Fragment for htmx requests, full document otherwise
    pub fn for_request(is_htmx: bool) -> Self {
        if is_htmx {
            RenderMode::Fragment
        } else {
            RenderMode::Full
        }
    }
}

/// Who the page is rendered for
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageUser<'a> {
    /// Email of the signed-in user, if any
    pub email: Option<&'a str>,
}

impl<'a> PageUser<'a> {
    /// Signed-in user
    pub fn signed_in(email: &'a str) -> Self {
        Self { email: Some(email) }
    }

    /// Anonymous visitor
    pub fn anonymous() -> Self {
        Self { email: None }
    }
}

/// Alert severity for [`Renderer::message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Red
    Danger,
    /// Yellow
    Warning,
}

impl Level {
    fn class(self) -> &'static str {
        match self {
            Level::Danger => "danger",
            Level::Warning => "warning",
        }
    }
}

/// Compiled templates
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Compile every embedded template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Landing page
    pub fn landing(&self, page_user: &PageUser<'_>, mode: RenderMode) -> Result<String> {
        self.page("landing.html", page_user, mode, context! {})
    }

    /// Login form posting back to `/login`, carrying `next` along
    pub fn login(&self, next: Option<&str>, mode: RenderMode) -> Result<String> {
        let action = login_url(next);
        self.page("login.html", &PageUser::anonymous(), mode, context! { action })
    }

    /// Directory table, sorted by name
    pub fn users(&self, page_user: &PageUser<'_>, mut users: Vec<User>, mode: RenderMode) -> Result<String> {
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        self.page("users.html", page_user, mode, context! { users })
    }

    /// One table row
    pub fn user_row(&self, user: &User) -> Result<String> {
        self.component("components/user_row.html", context! { user })
    }

    /// Empty create dialog
    pub fn create_dialog(&self) -> Result<String> {
        self.component("components/user_dialog.html", context! {})
    }

    /// Update dialog pre-filled with `user`
    pub fn update_dialog(&self, user: &User) -> Result<String> {
        self.component("components/user_dialog.html", context! { user })
    }

    /// Field-level error list
    pub fn errors(&self, errors: &ValidationErrors) -> Result<String> {
        self.component("components/errors.html", context! { errors })
    }

    /// Single alert
    pub fn message(&self, level: Level, message: &str) -> Result<String> {
        self.component(
            "components/message.html",
            context! { level => level.class(), message },
        )
    }

    /// Live viewer count badge
    pub fn connected(&self, count: usize) -> Result<String> {
        self.component("components/connected.html", context! { count })
    }

    fn page(&self, name: &str, page_user: &PageUser<'_>, mode: RenderMode, extra: Value) -> Result<String> {
        let ctx = context! {
            authenticated => page_user.email.is_some(),
            user_email => page_user.email,
            connected_event => CHANGE_EVENT,
            ..extra
        };

        let template = self.env.get_template(name)?;
        let html = match mode {
            RenderMode::Full => template.render(ctx)?,
            RenderMode::Fragment => template.eval_to_state(ctx)?.render_block(CONTENT_BLOCK)?,
        };
        Ok(html)
    }

    fn component(&self, name: &str, ctx: Value) -> Result<String> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
