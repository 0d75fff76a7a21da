//! Text rendering of the list, detail and form panes.

use std::io::{self, Write};

use blog_core::{DetailPane, FormPane, ListPane, Post, PostId};

fn tags(post: &Post) -> String {
    post.category
        .iter()
        .map(|c| format!("[{c}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_posts(out: &mut impl Write, posts: &[Post], selected: Option<&PostId>) -> io::Result<()> {
    if posts.is_empty() {
        return writeln!(out, "No posts yet.");
    }
    for (n, post) in posts.iter().enumerate() {
        let marker = if selected == Some(&post.id) { '>' } else { ' ' };
        writeln!(out, "{marker} {:>2}. {} {}", n + 1, tags(post), post.title)?;
        if let Some(description) = post.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "       {description}")?;
        }
    }
    Ok(())
}

pub fn list(out: &mut impl Write, pane: &ListPane<'_>) -> io::Result<()> {
    match pane {
        ListPane::Loading => writeln!(out, "Loading blogs..."),
        ListPane::Ready {
            posts,
            selected,
            refreshing,
        } => {
            write_posts(out, posts, *selected)?;
            if *refreshing {
                writeln!(out, "(refreshing...)")?;
            }
            Ok(())
        }
        ListPane::Failed { message, posts } => {
            writeln!(out, "Could not load posts: {message}")?;
            if !posts.is_empty() {
                write_posts(out, posts, None)?;
            }
            Ok(())
        }
    }
}

pub fn detail(out: &mut impl Write, pane: &DetailPane<'_>) -> io::Result<()> {
    match pane {
        DetailPane::Empty => writeln!(out, "Select a story to start reading"),
        DetailPane::Loading => writeln!(out, "Loading post..."),
        DetailPane::Failed(message) => writeln!(out, "Could not load post: {message}"),
        DetailPane::Ready { post, deleting } => {
            writeln!(out, "{}", tags(post))?;
            writeln!(out, "{}", post.title)?;
            writeln!(out, "{}", "=".repeat(post.title.chars().count()))?;
            writeln!(out, "{}  |  {}", post.date, post.cover_image)?;
            writeln!(out)?;
            writeln!(out, "{}", post.content)?;
            if *deleting {
                writeln!(out, "Deleting...")?;
            }
            Ok(())
        }
    }
}

pub fn form(out: &mut impl Write, pane: &FormPane<'_>) -> io::Result<()> {
    if pane.publishing {
        writeln!(out, "Publishing...")?;
    }
    if let Some(error) = pane.error {
        writeln!(out, "Publish failed: {error}")?;
    }
    Ok(())
}
