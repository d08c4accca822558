//! missions login/logout/whoami
//!
//! The CLI stands in for the authentication collaborator: whoever runs
//! `login` with a non-empty account id and name is trusted.

use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::output::{emit_success, Report};
use crate::session::{self, SavedSession};

use super::Context;

#[derive(serde::Serialize)]
struct WhoamiReport {
    account_id: String,
    display_name: String,
    balance: u64,
}

#[derive(serde::Serialize)]
struct LogoutReport {
    logged_out: bool,
}

pub fn run_login(ctx: &mut Context, account: &str, name: &str) -> Result<()> {
    let session = ctx.tracker.login(account, name)?;
    session::persist_session(
        ctx.base_dir(),
        &SavedSession {
            account_id: session.account_id.clone(),
            display_name: session.display_name.clone(),
        },
    )?;

    let mut report = Report::new(format!("missions login: {}", session.display_name));
    report
        .fact("account", &session.account_id)
        .fact("coins", session.balance);
    if session.created {
        report.line("created a new account");
        ctx.record_event(
            EventKind::AccountCreated,
            &session.account_id,
            &serde_json::json!({ "display_name": session.display_name }),
            &mut report,
        );
    }
    report.hint("missions tasks");

    emit_success(ctx.output, "login", &session, &report)
}

pub fn run_logout(ctx: &Context) -> Result<()> {
    let logged_out = session::clear_session(ctx.base_dir())?;

    let report = Report::new(if logged_out {
        "missions logout: signed out"
    } else {
        "missions logout: no saved login"
    });
    emit_success(ctx.output, "logout", &LogoutReport { logged_out }, &report)
}

pub fn run_whoami(ctx: &Context) -> Result<()> {
    let account_id = ctx.account_id()?;
    let record = match ctx.tracker.account(&account_id) {
        Ok(record) => record,
        Err(Error::AccountNotFound(_)) => return Err(Error::NotLoggedIn),
        Err(err) => return Err(err),
    };

    let mut report = Report::new(format!("missions whoami: {}", record.display_name));
    report
        .fact("account", &record.account_id)
        .fact("coins", record.state.balance);

    let whoami = WhoamiReport {
        account_id: record.account_id,
        display_name: record.display_name,
        balance: record.state.balance,
    };
    emit_success(ctx.output, "whoami", &whoami, &report)
}
