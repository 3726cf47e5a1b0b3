//! Command dispatch: bridges CLI args -> core controller -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod customers;
pub mod util;

use clientele_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => auth::login(controller, args, global).await,
        Command::Signup(args) => auth::signup(controller, args, global).await,
        Command::Logout => auth::logout(controller, global),
        Command::Whoami => auth::whoami(controller, global),
        Command::Customers(args) => customers::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };
    result.map_err(|e| e.for_profile(profile))
}
