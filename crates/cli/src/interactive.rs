use crate::{is_settled, print_snapshot};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use typeahead_protocol::SessionSnapshot;
use typeahead_search::TypeaheadHandle;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Text(&'a str),
    Pick(&'a str),
    Flush,
    Quit,
}

/// `:pick <id>`, `:flush` and `:quit` are commands; every other line is the
/// full contents of the search box after a keystroke.
fn parse_line(line: &str) -> Input<'_> {
    match line.trim_end_matches(['\r', '\n']) {
        ":quit" | ":q" => Input::Quit,
        ":flush" => Input::Flush,
        other => match other.strip_prefix(":pick ") {
            Some(id) => Input::Pick(id.trim()),
            None => Input::Text(other),
        },
    }
}

struct Printer {
    last: Option<SessionSnapshot>,
}

impl Printer {
    fn emit(&mut self, snapshot: SessionSnapshot) -> Result<()> {
        if self.last.as_ref() == Some(&snapshot) {
            return Ok(());
        }
        print_snapshot(&snapshot, false)?;
        self.last = Some(snapshot);
        Ok(())
    }
}

/// Drive one session from stdin until `:quit` or end of input.
///
/// At end of input the pending lookup is flushed and the final settled
/// snapshot is printed before the session is shut down.
pub async fn run(session: TypeaheadHandle) -> Result<()> {
    let mut updates = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printer = Printer { last: None };

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_line(&line) {
                    Input::Text(text) => session.text_changed(text).await?,
                    Input::Pick(id) => match session.choose(id).await {
                        Ok(candidate) => log::info!("Selected {} ({})", candidate.display_name, candidate.id),
                        Err(err) => log::warn!("Cannot pick '{id}': {err}"),
                    },
                    Input::Flush => session.flush().await?,
                    Input::Quit => {
                        session.shutdown().await?;
                        return Ok(());
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let snapshot = updates.borrow_and_update().clone();
                printer.emit(snapshot)?;
            }
        }
    }

    session.flush().await?;
    let settled = session.wait_for(|s| is_settled(&s.phase)).await?;
    printer.emit(settled)?;
    session.shutdown().await?;
    Ok(())
}
