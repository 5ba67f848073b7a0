//! Line-based console driver for [`SelectionSession`].

use std::io::{self, BufRead, Write};

use super::{Action, SelectionSession, CONFIRM_SAVE_PROMPT};
use crate::composer::Composer;

/// Run the selection loop until the user quits or input ends.
///
/// Reads one line per turn from `input` and writes menus and results to
/// `output`. Save failures are printed and the loop keeps going. End of input
/// exits without offering to save.
pub fn run<R, W>(
    session: &mut SelectionSession,
    composer: &Composer,
    mut input: R,
    mut output: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "=== System Prompt Combiner ===")?;
    writeln!(
        output,
        "The basic cleanup prompt is the foundation; select additional prompts to layer on top."
    )?;
    print_lines(&mut output, &session.menu())?;

    loop {
        write!(output, "\n{}", session.input_prompt())?;
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            tracing::debug!("Input closed, leaving selection session");
            writeln!(output)?;
            break;
        };

        let turn = session.handle(&line);
        print_lines(&mut output, &turn.lines)?;

        match turn.action {
            Action::Continue => {}
            Action::Save => save(session, composer, &mut output)?,
            Action::ConfirmSaveAndExit => {
                write!(output, "{}", CONFIRM_SAVE_PROMPT)?;
                output.flush()?;
                let answer = read_line(&mut input)?.unwrap_or_default();
                if answer.trim().eq_ignore_ascii_case("y") {
                    save(session, composer, &mut output)?;
                }
                break;
            }
            Action::Exit => break,
        }

        if turn.show_menu {
            print_lines(&mut output, &session.menu())?;
        }
    }

    writeln!(output, "Exiting program.")?;
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_lines<W: Write>(output: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(output, "{}", line)?;
    }
    Ok(())
}

fn save<W: Write>(
    session: &SelectionSession,
    composer: &Composer,
    output: &mut W,
) -> io::Result<()> {
    match composer.save(session.selection()) {
        Ok(saved) => {
            writeln!(
                output,
                "\nCombined prompt saved to: {}",
                saved.prompt_path.display()
            )?;
            writeln!(
                output,
                "Prompt metadata saved to: {}",
                saved.metadata_path.display()
            )?;
        }
        Err(e) => {
            tracing::error!("Failed to save combined prompt: {}", e);
            writeln!(output, "Failed to save combined prompt: {}", e)?;
        }
    }
    Ok(())
}
