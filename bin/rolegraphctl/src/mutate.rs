//! ---
//! rg_section: "06-cli"
//! rg_subsection: "binary"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Control CLI for administrators editing rolegraph rules."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use rolegraph_core::RuleManager;
use tracing::info;

/// Commands that change the rule file.
#[derive(Debug, Subcommand)]
pub enum MutateCommand {
    /// Grant a role to a user within a domain.
    AddRole(AddRoleArgs),
    /// Remove every role assignment of a user.
    DeleteUser(DeleteUserArgs),
    /// Remove a role from the hierarchy and the policies it is the subject of.
    DeleteRole(DeleteRoleArgs),
}

#[derive(Debug, Args)]
pub struct AddRoleArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub domain: String,
}

#[derive(Debug, Args)]
pub struct DeleteUserArgs {
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Args)]
pub struct DeleteRoleArgs {
    #[arg(long)]
    pub role: String,
}

/// Apply a mutation; prints whether anything changed.
pub fn run(command: MutateCommand, manager: &RuleManager, out: &mut impl Write) -> Result<()> {
    match command {
        MutateCommand::AddRole(args) => {
            let added = manager.add_role_for_user_in_domain(&args.user, &args.role, &args.domain)?;
            info!(user = %args.user, role = %args.role, domain = %args.domain, added, "add-role");
            writeln!(out, "{added}")?;
        }
        MutateCommand::DeleteUser(args) => {
            let removed = manager.delete_user(&args.user)?;
            info!(user = %args.user, removed, "delete-user");
            writeln!(out, "{removed}")?;
        }
        MutateCommand::DeleteRole(args) => {
            manager.delete_role(&args.role)?;
            writeln!(out, "true")?;
        }
    }
    Ok(())
}
