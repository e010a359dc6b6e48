//! Interactive session over a [`Scripts`] registry
//!
//! Lines are either commands (`list`, `register`, `run`, ...) or script
//! source, which is evaluated in the session's context with `db` and `log`
//! bound. Script globals persist between lines.

use std::io::{self, BufRead, Write};

use gscript_core::{ContextId, Scripts};

use crate::error::Result;
use crate::output::{parse_params, Output};

/// Result of processing one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandResult {
    Continue,
    Exit,
}

/// Interactive REPL
pub struct Repl {
    scripts: Scripts,
    context: ContextId,
    output: Output,
    history: Vec<String>,
}

impl Repl {
    /// Create a session running in `context`
    pub fn new(scripts: Scripts, context: ContextId, output: Output) -> Self {
        Self {
            scripts,
            context,
            output,
            history: Vec::new(),
        }
    }

    /// Lines entered so far
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Run on the terminal
    pub fn run(&mut self) -> Result<()> {
        println!("Welcome to gscript interactive mode!");
        println!("Type 'help' for available commands, 'quit' to exit.");
        println!();

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout, true)?;

        println!("Goodbye!");
        Ok(())
    }

    /// Run over arbitrary input and output; errors are reported inline
    pub fn run_with<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
        prompt: bool,
    ) -> Result<()> {
        loop {
            if prompt {
                write!(out, "gscript> ")?;
                out.flush()?;
            }

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.history.push(line.to_string());

            match self.process_command(line, out) {
                Ok(CommandResult::Continue) => continue,
                Ok(CommandResult::Exit) => break,
                Err(e) => {
                    writeln!(out, "Error: {}", e)?;
                    continue;
                }
            }
        }
        Ok(())
    }

    fn process_command<W: Write>(&mut self, line: &str, out: &mut W) -> Result<CommandResult> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" | "q" => Ok(CommandResult::Exit),
            "help" | "h" => {
                Self::show_help(out)?;
                Ok(CommandResult::Continue)
            }
            "history" => {
                for (i, entry) in self.history.iter().enumerate() {
                    writeln!(out, "{:4}  {}", i + 1, entry)?;
                }
                Ok(CommandResult::Continue)
            }
            "list" => {
                for name in self.scripts.list()? {
                    writeln!(out, "{}", name)?;
                }
                Ok(CommandResult::Continue)
            }
            "show" if !rest.is_empty() => {
                match self.scripts.source(rest)? {
                    Some(source) => writeln!(out, "{}", source)?,
                    None => writeln!(out, "Function {} not defined", rest)?,
                }
                Ok(CommandResult::Continue)
            }
            "register" => {
                let Some((name, code)) = rest.split_once(char::is_whitespace) else {
                    writeln!(out, "Usage: register <name> <function expression>")?;
                    return Ok(CommandResult::Continue);
                };
                let status = self.scripts.register(name, code.trim())?;
                self.output.write_status(out, &status)?;
                Ok(CommandResult::Continue)
            }
            "delete" if !rest.is_empty() => {
                let status = self.scripts.delete(rest)?;
                self.output.write_status(out, &status)?;
                Ok(CommandResult::Continue)
            }
            "run" if !rest.is_empty() => {
                let mut parts = rest.split_whitespace().map(str::to_string);
                let name = parts.next().unwrap_or_default();
                let params: Vec<String> = parts.collect();
                let records = self.scripts.run(self.context, &name, parse_params(&params))?;
                self.output.write_records(out, records)?;
                Ok(CommandResult::Continue)
            }
            _ => {
                let value = self.scripts.eval(self.context, line)?;
                self.output.write_value(out, &value)?;
                Ok(CommandResult::Continue)
            }
        }
    }

    fn show_help<W: Write>(out: &mut W) -> Result<()> {
        writeln!(out, "Commands:")?;
        writeln!(out, "  list                       List registered functions")?;
        writeln!(out, "  show <name>                Print a function's source")?;
        writeln!(out, "  register <name> <code>     Register or replace a function")?;
        writeln!(out, "  run <name> [json args...]  Run a function, one record per line")?;
        writeln!(out, "  delete <name>              Remove a function")?;
        writeln!(out, "  history                    Show entered lines")?;
        writeln!(out, "  help, h                    Show this help")?;
        writeln!(out, "  quit, exit, q              Leave")?;
        writeln!(out)?;
        writeln!(out, "Anything else is evaluated as script source.")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gscript_core::{MemoryGraph, ScriptsConfig};
    use gscript_store::MemoryPropertyStore;
    use pretty_assertions::assert_eq;

    fn session(input: &str) -> (Repl, String) {
        let scripts = Scripts::new(
            Arc::new(MemoryPropertyStore::new()),
            Arc::new(MemoryGraph::new()),
            ScriptsConfig::default(),
        );
        let mut repl = Repl::new(scripts, ContextId(1), Output::new(false));
        let mut out = Vec::new();
        repl.run_with(input.as_bytes(), &mut out, false).unwrap();
        (repl, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_register_run_list() {
        let (_, out) = session(
            "register double function(x) { return x * 2 }\n\
             run double 21\n\
             list\n",
        );
        assert_eq!(
            out,
            "{\"message\":\"Added Function double\"}\n{\"value\":42}\ndouble\n"
        );
    }

    #[test]
    fn test_eval_keeps_globals() {
        let (_, out) = session("x = 40\nx + 2\n");
        assert_eq!(out, "40\n42\n");
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let (repl, out) = session("run missing\n1 + 1\nquit\n3\n");
        assert!(out.starts_with("Error: Function missing not defined"));
        assert!(out.ends_with("2\n"));
        assert_eq!(repl.history().len(), 3);
    }

    #[test]
    fn test_show_and_delete() {
        let (_, out) = session(
            "register f function() { return 1 }\n\
             show f\n\
             delete f\n\
             show f\n",
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "function() { return 1 }");
        assert_eq!(lines[2], "{\"message\":\"Function 'f' removed\"}");
        assert_eq!(lines[3], "Function f not defined");
    }
}
