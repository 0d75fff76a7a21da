//! # blog
//!
//! Terminal front end for a REST blog store: list, read, publish and delete
//! posts. All state handling lives in `blog_core::BlogApp`; this binary owns
//! the transport, the terminal and the confirmation prompt.

mod args;
mod browse;
mod render;
mod transport;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use blog_core::{BlogApp, BlogClient, DetailPane, ListPane, MutationState, PostForm, PostId};
use chrono::Utc;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};
use crate::browse::{ask_yes_no, Session};
use crate::transport::UreqTransport;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    debug!(base_url = %cli.base_url, "starting");

    let transport = UreqTransport::new();
    let mut app = BlogApp::new(BlogClient::new(&cli.base_url));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ok = match cli.command() {
        Command::List => {
            let commands = app.mount();
            app.drive(&transport, commands);
            render::list(&mut out, &app.list_pane())?;
            !matches!(app.list_pane(), ListPane::Failed { .. })
        }
        Command::Show { id } => {
            let commands = app.select(PostId::new(id));
            app.drive(&transport, commands);
            render::detail(&mut out, &app.detail_pane())?;
            !matches!(app.detail_pane(), DetailPane::Failed(_))
        }
        Command::Create {
            title,
            category,
            content,
            description,
        } => {
            let form = PostForm {
                title,
                category,
                content,
                description,
            };
            app.open_form();
            let commands = app
                .submit_form(form, Utc::now())
                .context("post not published")?;
            app.drive(&transport, commands);
            match app.create_state() {
                MutationState::Failed(message) => {
                    writeln!(out, "Publish failed: {message}")?;
                    false
                }
                _ => {
                    writeln!(out, "Published.")?;
                    render::list(&mut out, &app.list_pane())?;
                    true
                }
            }
        }
        Command::Delete { id, yes } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let commands = app.delete(PostId::new(id), &mut |message: &str| {
                yes || ask_yes_no(&mut input, &mut io::stderr(), message)
            });
            if commands.is_empty() {
                writeln!(out, "Nothing deleted.")?;
                true
            } else {
                app.drive(&transport, commands);
                match app.delete_state() {
                    MutationState::Failed(message) => {
                        writeln!(out, "Delete failed: {message}")?;
                        false
                    }
                    _ => {
                        writeln!(out, "Deleted.")?;
                        true
                    }
                }
            }
        }
        Command::Browse => {
            let stdin = io::stdin();
            let mut session = Session::new(app, &transport, stdin.lock(), &mut out);
            session.run().context("interactive session failed")?;
            true
        }
    };

    out.flush()?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
