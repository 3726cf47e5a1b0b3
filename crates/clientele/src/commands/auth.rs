//! Session commands: login, signup, logout, whoami.

use clientele_core::{Controller, Identity, Route, RouteDecision};

use crate::cli::{GlobalOpts, LoginArgs, SignupArgs};
use crate::error::CliError;
use crate::output;

use super::{customers, util};

fn detail(identity: &Identity) -> String {
    let mut lines = vec![format!("Subject:  {}", identity.subject)];
    if !identity.roles.is_empty() {
        lines.push(format!("Roles:    {}", identity.roles.join(", ")));
    }
    if let Some(ref iss) = identity.issuer {
        lines.push(format!("Issuer:   {iss}"));
    }
    if let Some(exp) = identity.expires_at {
        lines.push(format!("Expires:  {}", exp.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.join("\n")
}

fn print_identity(identity: &Identity, global: &GlobalOpts) {
    let out = output::render_single(global.output, identity, detail, |i| i.subject.clone());
    output::print_output(&out, global.quiet);
}

/// Signed-in sessions skip the login and signup screens.
fn already_signed_in(controller: &Controller, route: Route) -> Option<Identity> {
    match controller.guard(route) {
        RouteDecision::Redirect(Route::Dashboard) => controller.session().identity(),
        _ => None,
    }
}

pub async fn login(
    controller: &Controller,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(identity) = already_signed_in(controller, Route::Login) {
        eprintln!(
            "Already signed in as {}. Run `clientele logout` to switch accounts.",
            identity.subject
        );
        return Ok(());
    }

    let username = match args.username {
        Some(u) => u,
        None => util::read_line("Email")?,
    };
    let password = util::read_password("Password: ")?;

    let mut form = controller.login_form();
    form.set("username", username)?;
    form.set("password", password)?;

    let identity = controller.submit_login(&mut form).await.into_result()?;
    print_identity(&identity, global);
    Ok(())
}

pub async fn signup(
    controller: &Controller,
    args: SignupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(identity) = already_signed_in(controller, Route::Signup) {
        eprintln!(
            "Already signed in as {}. Run `clientele logout` before signing up.",
            identity.subject
        );
        return Ok(());
    }

    let mut form = controller.signup_form();
    customers::fill_new_customer(&mut form, args.customer)?;

    let identity = controller.submit_signup(&mut form).await.into_result()?;
    print_identity(&identity, global);
    Ok(())
}

pub fn logout(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let was_signed_in = controller.session().is_authenticated();
    controller.logout()?;
    if !global.quiet {
        if was_signed_in {
            eprintln!("✓ Signed out");
        } else {
            eprintln!("Not signed in");
        }
    }
    Ok(())
}

pub fn whoami(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.require(Route::Dashboard)?;
    let identity = controller
        .session()
        .identity()
        .ok_or_else(|| CliError::Internal("session has no identity".into()))?;
    print_identity(&identity, global);
    Ok(())
}
