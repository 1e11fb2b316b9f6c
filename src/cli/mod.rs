//! Interactive console commands: parsing of REPL lines and their execution
//! against a [`Console`]. Output is returned as text so the binary only prints.

pub mod table;

use crate::api::{dashboard, posts, profile, roles, users};
use crate::console::Console;
use crate::error::{AppError, AppResult};
use crate::identity::{LoginOutcome, LoginRequest};
use crate::routes::GuardDecision;

pub use table::render_table;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub const HELP_TEXT: &str = "Commands:
  login [<email> <password>]   sign in (falls back to --email/--password)
  verify <code>                complete a pending two-factor sign-in
  logout                       sign out and clear stored tokens
  whoami                       show the signed-in identity
  can <permission>             check a permission for the current identity
  open <path>                  run the route guard for a console view
  users [page] [search]        list users
  roles                        list roles
  posts                        list posts
  dashboard                    show dashboard analytics
  profile <username>           show a public profile
  help                         show this help
  quit | exit                  leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Option<LoginRequest>),
    Verify(String),
    Logout,
    WhoAmI,
    Can(String),
    Open(String),
    Users { page: u32, search: Option<String> },
    Roles,
    Posts,
    Dashboard,
    Profile(String),
    Help,
    Quit,
}

/// Parse one REPL line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> AppResult<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else { return Ok(None) };
    let rest: Vec<&str> = parts.collect();
    let cmd = match head.to_ascii_uppercase().as_str() {
        "LOGIN" => match rest.as_slice() {
            [] => Command::Login(None),
            [email, password] => Command::Login(Some(LoginRequest { email: email.to_string(), password: password.to_string() })),
            _ => return Err(usage("login [<email> <password>]")),
        },
        "VERIFY" => Command::Verify(single_arg(&rest, "verify <code>")?),
        "LOGOUT" => Command::Logout,
        "WHOAMI" => Command::WhoAmI,
        "CAN" => Command::Can(single_arg(&rest, "can <permission>")?),
        "OPEN" => Command::Open(single_arg(&rest, "open <path>")?),
        "USERS" => {
            let page = match rest.first() {
                Some(p) => p.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| usage("users [page] [search]"))?,
                None => 1,
            };
            let search = if rest.len() > 1 { Some(rest[1..].join(" ")) } else { None };
            Command::Users { page, search }
        }
        "ROLES" => Command::Roles,
        "POSTS" => Command::Posts,
        "DASHBOARD" => Command::Dashboard,
        "PROFILE" => Command::Profile(single_arg(&rest, "profile <username>")?),
        "HELP" | "?" => Command::Help,
        "QUIT" | "EXIT" => Command::Quit,
        other => return Err(AppError::user("unknown_command", format!("Unknown command '{}'. Type 'help'.", other.to_ascii_lowercase()))),
    };
    Ok(Some(cmd))
}

fn single_arg(rest: &[&str], form: &str) -> AppResult<String> {
    match rest {
        [one] => Ok(one.to_string()),
        _ => Err(usage(form)),
    }
}

fn usage(form: &str) -> AppError { AppError::user("usage", format!("usage: {}", form)) }

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Repl {
    console: Console,
    default_credentials: Option<LoginRequest>,
    pending_two_factor: Option<String>,
}

impl Repl {
    pub fn new(console: Console, default_credentials: Option<LoginRequest>) -> Self {
        Self { console, default_credentials, pending_two_factor: None }
    }

    pub fn console(&self) -> &Console { &self.console }

    pub fn prompt(&self) -> String {
        match self.console.session().identity() {
            Some(id) => format!("{}> ", id.display_name()),
            None => "> ".to_string(),
        }
    }

    /// Parse and run one line. Errors come back as their user-facing message.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match parse_command(line) {
            Ok(None) => Flow::Continue(String::new()),
            Ok(Some(cmd)) => match self.execute(cmd).await {
                Ok(flow) => flow,
                Err(e) => Flow::Continue(format!("error: {}", e.user_message())),
            },
            Err(e) => Flow::Continue(e.user_message().to_string()),
        }
    }

    pub async fn execute(&mut self, cmd: Command) -> AppResult<Flow> {
        let out = match cmd {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => HELP_TEXT.to_string(),
            Command::Login(creds) => {
                let creds = creds
                    .or_else(|| self.default_credentials.clone())
                    .ok_or_else(|| AppError::user("missing_credentials", "usage: login <email> <password>"))?;
                let outcome = self.console.session().login(&creds).await?;
                self.describe_outcome(outcome)
            }
            Command::Verify(code) => {
                let email = self
                    .pending_two_factor
                    .clone()
                    .ok_or_else(|| AppError::user("no_pending_verification", "No sign-in is waiting for a verification code."))?;
                let outcome = self.console.session().verify_two_factor(&email, &code).await?;
                self.describe_outcome(outcome)
            }
            Command::Logout => {
                self.pending_two_factor = None;
                self.console.session().logout();
                "signed out".to_string()
            }
            Command::WhoAmI => match self.console.session().identity() {
                Some(id) => {
                    let perms: Vec<&str> = id.permissions.iter().map(String::as_str).collect();
                    format!(
                        "{} <{}>\nroles: {}\npermissions: {}",
                        id.display_name(),
                        id.email,
                        id.role.names().join(", "),
                        if perms.is_empty() { "-".to_string() } else { perms.join(", ") }
                    )
                }
                None => "not signed in".to_string(),
            },
            Command::Can(perm) => {
                let yes = self.console.session().has_permission(&perm);
                format!("{}: {}", perm, if yes { "yes" } else { "no" })
            }
            Command::Open(path) => {
                let decision = self.console.navigate(&path);
                match &decision {
                    GuardDecision::Allow => format!("-> {}", decision.destination(&path)),
                    GuardDecision::RedirectToLogin => format!("-> {} (sign in required)", decision.destination(&path)),
                    GuardDecision::Deny { notice } => format!("{}\n-> {}", notice, decision.destination(&path)),
                }
            }
            Command::Users { page, search } => {
                let page = users::list_users(self.console.client(), page, DEFAULT_PAGE_SIZE, search.as_deref()).await?;
                let rows: Vec<Vec<String>> = page
                    .items
                    .iter()
                    .map(|u| {
                        vec![
                            u.id.to_string(),
                            u.display_name(),
                            u.email.clone(),
                            u.primary_role().unwrap_or("-").to_string(),
                            if u.email_confirmed { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                let footer = format!("page {}/{} ({} users)", page.page, page.total_pages.max(1), page.total_count);
                with_footer(render_table(&["id", "name", "email", "role", "verified"], &rows), &footer)
            }
            Command::Roles => {
                let list = roles::list_roles(self.console.client()).await?;
                let rows: Vec<Vec<String>> =
                    list.iter().map(|r| vec![r.id.to_string(), r.name.clone(), r.permissions.len().to_string()]).collect();
                render_table(&["id", "name", "permissions"], &rows).unwrap_or_else(|| "no roles".to_string())
            }
            Command::Posts => {
                let list = posts::list_posts(self.console.client()).await?;
                let rows: Vec<Vec<String>> = list
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.title.clone(),
                            p.category().map(|c| c.name()).unwrap_or("-").to_string(),
                            p.created_at.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                render_table(&["id", "title", "category", "created"], &rows).unwrap_or_else(|| "no posts".to_string())
            }
            Command::Dashboard => {
                let a = dashboard::dashboard_analytics(self.console.client()).await;
                let s = &a.stats;
                let stats = vec![
                    vec!["total users".to_string(), s.total_users.to_string()],
                    vec!["admins".to_string(), s.total_admins.to_string()],
                    vec!["organizations".to_string(), s.total_organizations.to_string()],
                    vec!["regular users".to_string(), s.total_regular_users.to_string()],
                    vec!["verified".to_string(), s.verified_accounts.to_string()],
                    vec!["pending".to_string(), s.pending_accounts.to_string()],
                    vec!["locked".to_string(), s.locked_accounts.to_string()],
                ];
                let mut out = render_table(&["metric", "value"], &stats).unwrap_or_default();
                let recent: Vec<Vec<String>> = a.recent_users.iter().map(|u| vec![u.display_name(), u.email.clone()]).collect();
                if let Some(t) = render_table(&["recent user", "email"], &recent) {
                    out.push('\n');
                    out.push_str(&t);
                }
                out
            }
            Command::Profile(username) => {
                let p = profile::get_profile(self.console.client(), &username).await?;
                let name = p.full_name();
                format!(
                    "{}{}\n{}",
                    p.username.as_deref().unwrap_or(&username),
                    if name.is_empty() { String::new() } else { format!(" ({})", name) },
                    p.bio.as_deref().unwrap_or("")
                )
                .trim_end()
                .to_string()
            }
        };
        Ok(Flow::Continue(out))
    }

    fn describe_outcome(&mut self, outcome: LoginOutcome) -> String {
        match outcome {
            LoginOutcome::Authenticated(id) => {
                self.pending_two_factor = None;
                format!("signed in as {}", id.display_name())
            }
            LoginOutcome::TwoFactorRequired { email } => {
                let msg = format!("verification code sent to {}; use 'verify <code>'", email);
                self.pending_two_factor = Some(email);
                msg
            }
        }
    }
}

fn with_footer(table: Option<String>, footer: &str) -> String {
    match table {
        Some(t) => format!("{}\n{}", t, footer),
        None => footer.to_string(),
    }
}
