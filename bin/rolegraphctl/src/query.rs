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
use rolegraph_core::{RuleManager, Section};

/// Read-only commands.
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Roles a user holds, breadth-first.
    Roles(UserScope),
    /// Users holding a role, breadth-first.
    Users(RoleScope),
    /// Print `true` when the user holds the role.
    Check(CheckArgs),
    /// Print rules as `ptype, v0, v1, ...`.
    List(ListArgs),
    /// Distinct roles named in grouping rules.
    AllRoles,
    /// Direct role links.
    Links(LinksArgs),
}

/// A user plus optional domain.
#[derive(Debug, Args)]
pub struct UserScope {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub domain: Option<String>,
}

/// A role plus optional domain.
#[derive(Debug, Args)]
pub struct RoleScope {
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub role: String,
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only rules of this section (`p` or `g`).
    #[arg(long)]
    pub section: Option<Section>,
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Emit JSON instead of one link per line.
    #[arg(long)]
    pub json: bool,
}

fn scope(domain: &Option<String>) -> Vec<&str> {
    domain.as_deref().into_iter().collect()
}

/// Execute a query against the loaded rules.
pub fn run(command: QueryCommand, manager: &RuleManager, out: &mut impl Write) -> Result<()> {
    match command {
        QueryCommand::Roles(args) => {
            for role in manager.get_roles_for_user(&args.user, &scope(&args.domain)) {
                writeln!(out, "{role}")?;
            }
        }
        QueryCommand::Users(args) => {
            for user in manager.get_users_for_role(&args.role, &scope(&args.domain)) {
                writeln!(out, "{user}")?;
            }
        }
        QueryCommand::Check(args) => {
            let held = manager.has_role_for_user(&args.user, &args.role, &scope(&args.domain));
            writeln!(out, "{held}")?;
        }
        QueryCommand::List(args) => {
            for (section, ptype, rule) in manager.rule_lines() {
                if args.section.map_or(true, |wanted| wanted == section) {
                    writeln!(out, "{ptype}, {rule}")?;
                }
            }
        }
        QueryCommand::AllRoles => {
            for role in manager.get_all_roles()? {
                writeln!(out, "{role}")?;
            }
        }
        QueryCommand::Links(args) => {
            let links = manager.role_links();
            if args.json {
                serde_json::to_writer_pretty(&mut *out, &links)?;
                writeln!(out)?;
            } else {
                for link in links {
                    if link.domain.is_empty() {
                        writeln!(out, "{} -> {}", link.name, link.role)?;
                    } else {
                        let domain = link.domain.join(", ");
                        writeln!(out, "{} -> {} @ {domain}", link.name, link.role)?;
                    }
                }
            }
        }
    }
    Ok(())
}
