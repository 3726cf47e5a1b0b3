//! Customer command handlers.

use tabled::Tabled;

use clientele_core::{Controller, CreateForm, Customer, CustomerApi, CustomerId, ListState, Route};

use crate::cli::{CustomersArgs, CustomersCommand, GlobalOpts, NewCustomerArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Age")]
    age: u32,
    #[tabled(rename = "Gender")]
    gender: String,
}

impl From<&Customer> for CustomerRow {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            email: c.email.clone(),
            age: c.age,
            gender: c.gender.to_string(),
        }
    }
}

fn detail(c: &Customer) -> String {
    let mut lines = vec![
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("Email:     {}", c.email),
        format!("Age:       {}", c.age),
        format!("Gender:    {}", c.gender),
    ];
    if !c.roles.is_empty() {
        lines.push(format!("Roles:     {}", c.roles.join(", ")));
    }
    lines.join("\n")
}

/// Copy new-customer flags into a create or signup form.
pub(super) fn fill_new_customer(
    form: &mut CreateForm,
    args: NewCustomerArgs,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(p) => p,
        None => util::read_password("Password: ")?,
    };
    form.set("name", args.name)?;
    form.set("email", args.email)?;
    form.set("age", args.age.to_string())?;
    form.set("gender", args.gender.to_string())?;
    form.set("password", password)?;
    Ok(())
}

async fn fetch(controller: &Controller, id: &str) -> Result<Customer, CliError> {
    let customer = CustomerApi::get(controller.api().as_ref(), &CustomerId::from(id)).await?;
    Ok(customer)
}

/// Refetch the list after a mutation. The one-shot CLI never runs the
/// refresh loop, so queued refresh requests are served here instead.
/// The mutation already succeeded; a failed refetch is only logged.
async fn refresh_after_change(controller: &Controller) {
    if let Err(e) = controller.customers().refresh().await {
        tracing::warn!(error = %e, "customer refresh task failed");
        return;
    }
    match controller.customers().state() {
        ListState::Ready(list) => tracing::debug!(count = list.len(), "customer list refreshed"),
        ListState::Error(message) => tracing::warn!(error = %message, "customer refresh failed"),
        ListState::Loading => {}
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: CustomersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.require(Route::Customers)?;

    match args.command {
        CustomersCommand::List => {
            let spinner = util::spinner("Loading customers…", global.quiet);
            controller
                .customers()
                .refresh()
                .await
                .map_err(|e| CliError::Internal(e.to_string()))?;
            spinner.finish_and_clear();

            let list = match controller.customers().state() {
                ListState::Ready(list) => list,
                ListState::Error(message) => {
                    return Err(CliError::ApiError {
                        code: "list".into(),
                        message,
                        status: None,
                    });
                }
                ListState::Loading => {
                    return Err(CliError::Internal("customer list never settled".into()));
                }
            };

            if list.is_empty() && global.output == OutputFormat::Table {
                if !global.quiet {
                    eprintln!("No customers available");
                }
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                list.as_slice(),
                |c| CustomerRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CustomersCommand::Get { id } => {
            let customer = fetch(controller, &id).await?;
            let out = output::render_single(global.output, &customer, detail, |c| {
                c.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CustomersCommand::Create(new) => {
            let mut form = controller.create_form();
            fill_new_customer(&mut form, new)?;
            controller.submit_create(&mut form).await.into_result()?;
            refresh_after_change(controller).await;
            Ok(())
        }

        CustomersCommand::Update {
            id,
            name,
            email,
            age,
        } => {
            let customer = fetch(controller, &id).await?;
            let mut form = controller.update_form(&customer);
            if let Some(name) = name {
                form.set("name", name)?;
            }
            if let Some(email) = email {
                form.set("email", email)?;
            }
            if let Some(age) = age {
                form.set("age", age.to_string())?;
            }
            if !form.is_dirty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass --name, --email, or --age".into(),
                });
            }

            let updated = controller.submit_update(&mut form).await.into_result()?;
            refresh_after_change(controller).await;
            if let Some(updated) = updated {
                let out = output::render_single(global.output, &updated, detail, |c| {
                    c.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        CustomersCommand::Delete { id } => {
            let customer = fetch(controller, &id).await?;
            let prompt = format!("Delete {} <{}>?", customer.name, customer.email);
            if !util::confirm(&prompt, "customers delete", global.yes)? {
                return Ok(());
            }
            controller.delete(&customer).await?;
            refresh_after_change(controller).await;
            Ok(())
        }
    }
}
