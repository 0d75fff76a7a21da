//! Interactive list/detail session.
//!
//! Reads one command per line from `input` and renders panes to `output`.
//! Every request goes through `BlogApp`, so list refreshes after a publish or
//! delete come from cache invalidation rather than from this loop.

use std::io::{self, BufRead, Write};

use blog_core::{BlogApp, ListPane, MutationState, PostForm, PostId, Transport};
use chrono::Utc;
use tracing::debug;

use crate::render;

const HELP: &str = "\
commands:
  list              show all posts
  open <n|id>       read a post by list number or id
  new               write a new post
  delete            delete the open post
  refresh           re-fetch the list
  help              show this text
  quit              leave";

pub struct Session<'t, R, W, T> {
    app: BlogApp,
    transport: &'t T,
    input: R,
    output: W,
}

/// Ask a yes/no question. Anything but `y`/`yes` (or end of input) is a no.
pub fn ask_yes_no(input: &mut impl BufRead, output: &mut impl Write, message: &str) -> bool {
    if write!(output, "{message} [y/N] ").and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}

impl<'t, R: BufRead, W: Write, T: Transport> Session<'t, R, W, T> {
    pub fn new(app: BlogApp, transport: &'t T, input: R, output: W) -> Self {
        Self {
            app,
            transport,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn app(&self) -> &BlogApp {
        &self.app
    }

    pub fn run(&mut self) -> io::Result<()> {
        let commands = self.app.mount();
        self.app.drive(self.transport, commands);
        render::list(&mut self.output, &self.app.list_pane())?;
        writeln!(self.output, "type 'help' for commands")?;

        loop {
            write!(self.output, "blog> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            let mut words = line.split_whitespace();
            let Some(verb) = words.next() else {
                continue;
            };
            debug!(verb, "browse command");
            match verb {
                "list" | "ls" => render::list(&mut self.output, &self.app.list_pane())?,
                "open" | "show" => match words.next() {
                    Some(target) => self.open(target)?,
                    None => writeln!(self.output, "usage: open <n|id>")?,
                },
                "new" => self.new_post()?,
                "delete" | "rm" => self.delete()?,
                "refresh" => {
                    let commands = self.app.refresh();
                    self.app.drive(self.transport, commands);
                    render::list(&mut self.output, &self.app.list_pane())?;
                }
                "help" | "?" => writeln!(self.output, "{HELP}")?,
                "quit" | "exit" | "q" => return Ok(()),
                other => writeln!(self.output, "unknown command '{other}', try 'help'")?,
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// A list number when it parses and is in range, otherwise a raw id.
    fn resolve_target(&self, target: &str) -> PostId {
        if let (Ok(n), ListPane::Ready { posts, .. }) = (target.parse::<usize>(), self.app.list_pane()) {
            if let Some(post) = n.checked_sub(1).and_then(|i| posts.get(i)) {
                return post.id.clone();
            }
        }
        PostId::new(target)
    }

    fn open(&mut self, target: &str) -> io::Result<()> {
        let id = self.resolve_target(target);
        let commands = self.app.select(id);
        self.app.drive(self.transport, commands);
        render::detail(&mut self.output, &self.app.detail_pane())
    }

    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Content is multi-line; a line holding a single `.` ends it.
    fn prompt_content(&mut self) -> io::Result<String> {
        writeln!(self.output, "content (end with a line containing only '.'):")?;
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line == "." {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn new_post(&mut self) -> io::Result<()> {
        self.app.open_form();
        let title = self.prompt("title")?;
        let category = self.prompt("category (e.g. FINTECH)")?;
        let content = self.prompt_content()?;

        let form = PostForm::new(&title, &category, &content);
        match self.app.submit_form(form, Utc::now()) {
            Ok(commands) => {
                if let Some(pane) = self.app.form_pane() {
                    render::form(&mut self.output, &pane)?;
                }
                self.app.drive(self.transport, commands);
            }
            Err(e) => {
                writeln!(self.output, "{e}")?;
                self.app.close_form();
                return Ok(());
            }
        }

        match self.app.form_pane() {
            Some(pane) => {
                render::form(&mut self.output, &pane)?;
                self.app.close_form();
            }
            None => {
                writeln!(self.output, "published")?;
                render::list(&mut self.output, &self.app.list_pane())?;
            }
        }
        Ok(())
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(id) = self.app.selected().cloned() else {
            return writeln!(self.output, "open a post first");
        };
        let input = &mut self.input;
        let output = &mut self.output;
        let commands = self
            .app
            .delete(id, &mut |message: &str| ask_yes_no(&mut *input, &mut *output, message));
        if commands.is_empty() {
            return writeln!(self.output, "kept");
        }
        self.app.drive(self.transport, commands);

        if let MutationState::Failed(message) = self.app.delete_state() {
            writeln!(self.output, "delete failed: {message}")?;
            return render::detail(&mut self.output, &self.app.detail_pane());
        }
        writeln!(self.output, "deleted")?;
        render::list(&mut self.output, &self.app.list_pane())
    }
}
